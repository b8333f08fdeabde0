//! 重写执行与回合状态机
//!
//! [`run_pass`] 是整台"虚拟机"的执行语义：按表序对整张规则表做
//! 恰好一次折叠，前一条规则的输出是后一条的输入。pass 内每条规则
//! 都必定尝试匹配——不重复、不跳过、不做 fixpoint 迭代。分支、
//! 循环与两层搜索全靠规则表把标记留在草稿区、由同一 pass 里靠后
//! 的规则接力完成。
//!
//! [`TurnCycle`] 是对外可见的工作单元：跑一次 pass、暴露结果、
//! 接收对手的下一行输入、上报是否终局。两阶段循环就是全部控制
//! 结构，没有独立的"搜索"状态。

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::state::GameState;
use crate::table::RuleTable;
use crate::types::{EngineError, Phase, TickReport};

/// 全局替换计数器（跨 pass 累计，用于 CLI 统计）
pub static REWRITE_COUNT: AtomicU64 = AtomicU64::new(0);

/// 全局"产生过替换的规则"计数器
pub static RULES_FIRED: AtomicU64 = AtomicU64::new(0);

pub fn reset_rewrite_count() {
    REWRITE_COUNT.store(0, AtomicOrdering::Relaxed);
}

pub fn get_rewrite_count() -> u64 {
    REWRITE_COUNT.load(AtomicOrdering::Relaxed)
}

pub fn reset_rules_fired() {
    RULES_FIRED.store(0, AtomicOrdering::Relaxed);
}

pub fn get_rules_fired() -> u64 {
    RULES_FIRED.load(AtomicOrdering::Relaxed)
}

/// 引擎配置
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// 单次 pass 的时间上限（秒）
    ///
    /// pass 中途不可取消，超时在 pass 结束后检测；一旦超过，
    /// 该对局作废，没有部分进度可恢复。
    pub time_limit: Option<f64>,
}

/// 执行一次 pass
///
/// `(table, state)` 的纯函数：同样输入两次调用产出同样输出。
/// 除了返回新串之外没有任何副作用（计数器只用于统计）。
pub fn run_pass(table: &RuleTable, state: GameState) -> Result<GameState, EngineError> {
    let mut text = state.into_text();
    for rule in table.rules() {
        let (next, rewrites) = rule.apply(&text)?;
        if rewrites > 0 {
            REWRITE_COUNT.fetch_add(rewrites, AtomicOrdering::Relaxed);
            RULES_FIRED.fetch_add(1, AtomicOrdering::Relaxed);
            debug!(
                "rule {} fired: {} rewrites, state now {} bytes",
                rule.index(),
                rewrites,
                next.len()
            );
        }
        text = next;
    }
    Ok(GameState::from_text(text))
}

/// 回合状态机
///
/// 独占持有当前 [`GameState`]；规则表只读共享（`Arc`），同进程
/// 多局对弈可以共用一张表。
pub struct TurnCycle {
    table: Arc<RuleTable>,
    state: GameState,
    phase: Phase,
    config: EngineConfig,
}

impl TurnCycle {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self::with_config(table, EngineConfig::default())
    }

    pub fn with_config(table: Arc<RuleTable>, config: EngineConfig) -> Self {
        TurnCycle {
            table,
            state: GameState::new(),
            phase: Phase::AwaitingEngineMove,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 当前状态（两次 tick 之间只读可见）
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// 驱动协议的一步
    ///
    /// - `AwaitingEngineMove`：input 必须为 `None`，跑一次 pass
    /// - `AwaitingOpponentInput`：必须提供 input，先追加再跑 pass
    /// - `Terminal`：一律 [`EngineError::Terminated`]
    ///
    /// 超时或内部错误时保留 tick 之前的状态并让对局作废——调用方
    /// 看到的要么是完整的新状态，要么是类型化的失败，绝无中间态。
    pub fn tick(&mut self, input: Option<&str>) -> Result<TickReport, EngineError> {
        match self.phase {
            Phase::Terminal => return Err(EngineError::Terminated),
            Phase::AwaitingEngineMove => {
                if input.is_some() {
                    return Err(EngineError::UnexpectedInput);
                }
            }
            Phase::AwaitingOpponentInput => match input {
                Some(_) => {}
                None => return Err(EngineError::MissingInput),
            },
        }

        let fallback = self.state.clone();
        let mut working = self.state.clone();
        if let Some(token) = input {
            working = working.append_input(token);
        }

        let rewrites_before = get_rewrite_count();
        let fired_before = get_rules_fired();
        let start = Instant::now();

        let passed = match run_pass(&self.table, working) {
            Ok(next) => next,
            Err(e) => {
                // 半成品状态不落盘，对局作废
                self.state = fallback;
                self.phase = Phase::Terminal;
                return Err(e);
            }
        };
        let elapsed = start.elapsed();

        if let Some(limit) = self.config.time_limit {
            if elapsed.as_secs_f64() > limit {
                self.state = fallback;
                self.phase = Phase::Terminal;
                return Err(EngineError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: (limit * 1000.0) as u64,
                });
            }
        }

        self.state = passed;
        if self.state.is_terminal() {
            self.phase = Phase::Terminal;
        } else {
            self.phase = Phase::AwaitingOpponentInput;
            if self.state.has_scratch() {
                warn!("scratch region survived the pass; rule table violates the cleanup convention");
            }
        }

        Ok(TickReport {
            state: self.state.as_str().to_string(),
            terminal: self.phase == Phase::Terminal,
            rules_fired: get_rules_fired() - fired_before,
            rewrites: get_rewrite_count() - rewrites_before,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }
}
