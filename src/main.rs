//! Regex Chess CLI
//!
//! 命令行界面，驱动重写引擎
//!
//! 支持两种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use regex_chess::{
    get_rewrite_count, get_rules_fired, reset_rewrite_count, reset_rules_fired, run_pass,
    EngineConfig, GameState, RuleTable, TurnCycle,
};

#[derive(Parser)]
#[command(name = "regex-chess")]
#[command(about = "Term-rewriting chess engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 交互对局：跑 pass、打印状态、读一行输入，直到终局
    Play {
        /// 规则表工件路径（JSON）
        #[arg(long)]
        table: PathBuf,

        /// 单次 pass 的时间上限（秒）
        #[arg(long)]
        time_limit: Option<f64>,
    },

    /// 加载并校验规则表工件
    Validate {
        /// 规则表工件路径（JSON）
        #[arg(long)]
        table: PathBuf,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 对给定状态跑一次 pass（规则表创作调试用）
    Tick {
        /// 规则表工件路径（JSON）
        #[arg(long)]
        table: PathBuf,

        /// 起始状态文本（默认空串）
        #[arg(long)]
        state: Option<String>,

        /// 从文件读起始状态
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// 先追加一行输入再跑 pass
        #[arg(long)]
        input: Option<String>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        /// 规则表工件路径（JSON）
        #[arg(long)]
        table: PathBuf,
    },
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    time_limit: Option<f64>,
}

#[derive(Serialize, Deserialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terminal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewrites: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules_fired: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success_tick(report: &regex_chess::TickReport, phase: String) -> Self {
        Self {
            ok: true,
            state: Some(report.state.clone()),
            terminal: Some(report.terminal),
            phase: Some(phase),
            rewrites: Some(report.rewrites),
            rules_fired: Some(report.rules_fired),
            elapsed_ms: Some(report.elapsed_ms),
            ..Default::default()
        }
    }

    fn success_new() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct ValidateResponse {
    ok: bool,
    rules: usize,
}

#[derive(Serialize)]
struct TickResponse {
    state: String,
    terminal: bool,
    rewrites: u64,
    rules_fired: u64,
    elapsed_ms: f64,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { table, time_limit } => run_play(&table, time_limit),
        Commands::Validate { table, json } => run_validate(&table, json),
        Commands::Tick {
            table,
            state,
            state_file,
            input,
            json,
        } => run_tick(&table, state, state_file, input, json),
        Commands::Server { table } => run_server(&table),
    }
}

fn load_table_or_exit(path: &Path) -> Arc<RuleTable> {
    match RuleTable::load(path) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// 交互对局主循环
///
/// 等价于原始驱动协议：tick（无输入）、打印、读一行、tick（带输入），
/// 直到状态出现终局标记或 stdin 关闭。
fn run_play(table_path: &Path, time_limit: Option<f64>) {
    let table = load_table_or_exit(table_path);
    let mut game = TurnCycle::with_config(table, EngineConfig { time_limit });

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    reset_rewrite_count();
    reset_rules_fired();
    let start = Instant::now();

    let mut report = match game.tick(None) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        print!("{}", report.state);
        let _ = stdout.flush();

        if report.terminal {
            break;
        }

        let line = match lines.next() {
            Some(Ok(l)) => l,
            _ => break,
        };

        report = match game.tick(Some(&line)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
    }

    let elapsed = start.elapsed().as_secs_f64();
    eprintln!(
        "Stats: rules_fired={}, rewrites={}, time={:.3}s",
        get_rules_fired(),
        get_rewrite_count(),
        elapsed
    );
}

fn run_validate(table_path: &Path, json: bool) {
    match RuleTable::load(table_path) {
        Ok(table) => {
            if json {
                let response = ValidateResponse {
                    ok: true,
                    rules: table.len(),
                };
                println!("{}", serde_json::to_string_pretty(&response).unwrap());
            } else {
                println!("OK: {} rules", table.len());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_tick(
    table_path: &Path,
    state: Option<String>,
    state_file: Option<PathBuf>,
    input: Option<String>,
    json: bool,
) {
    let table = load_table_or_exit(table_path);

    let text = match (state, state_file) {
        (Some(s), _) => s,
        (None, Some(path)) => match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        (None, None) => String::new(),
    };

    let mut state = GameState::from_text(text);
    if let Some(token) = input {
        state = state.append_input(&token);
    }

    reset_rewrite_count();
    reset_rules_fired();
    let start = Instant::now();

    match run_pass(&table, state) {
        Ok(next) => {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            if json {
                let response = TickResponse {
                    state: next.as_str().to_string(),
                    terminal: next.is_terminal(),
                    rewrites: get_rewrite_count(),
                    rules_fired: get_rules_fired(),
                    elapsed_ms,
                };
                println!("{}", serde_json::to_string_pretty(&response).unwrap());
            } else {
                print!("{}", next);
                let _ = io::stdout().flush();
            }
            eprintln!(
                "Stats: rules_fired={}, rewrites={}, time={:.3}ms",
                get_rules_fired(),
                get_rewrite_count(),
                elapsed_ms
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
///
/// 命令：
/// - `{"cmd": "new", "time_limit": 3.0}` - 开新对局（替换当前对局）
/// - `{"cmd": "tick"}` / `{"cmd": "tick", "input": "e7e5"}` - 推进一步
/// - `{"cmd": "quit"}` - 退出
fn run_server(table_path: &Path) {
    let table = load_table_or_exit(table_path);
    let mut game: Option<TurnCycle> = None;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = ServerResponse::error(&format!("Invalid JSON: {}", e));
                println!("{}", serde_json::to_string(&response).unwrap());
                let _ = stdout.flush();
                continue;
            }
        };

        // 处理命令
        let response = match request.cmd.as_str() {
            "new" => {
                let config = EngineConfig {
                    time_limit: request.time_limit,
                };
                game = Some(TurnCycle::with_config(Arc::clone(&table), config));
                ServerResponse::success_new()
            }
            "tick" => match game.as_mut() {
                Some(g) => match g.tick(request.input.as_deref()) {
                    Ok(report) => ServerResponse::success_tick(&report, g.phase().to_string()),
                    Err(e) => ServerResponse::error(&e.to_string()),
                },
                None => ServerResponse::error("no game in progress; send {\"cmd\": \"new\"} first"),
            },
            "quit" => break,
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        };

        // 返回响应
        println!("{}", serde_json::to_string(&response).unwrap());
        let _ = stdout.flush();
    }
}
