//! 测试用规则表库
//!
//! 提供命名的 JSON 工件文本，方便测试、基准和调试。生产规则表
//! （数百条编码完整国际象棋语义与两层搜索的规则）是外部创作的
//! 工件，这里只收录覆盖引擎契约的缩微脚本表。
//!
//! 脚本对局表完整演示了工件的创作惯例：
//! - 空串 bootstrap（`^$` → `<` → 初始显示）
//! - 把待处理输入改写进 `%%` 草稿线程，由同一 pass 内靠后的规则接力
//! - 具体分支规则在前、兜底非法输入规则在后的排序纪律
//! - 在产生草稿的同一 pass 内把草稿清理干净

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::table::RuleTable;

// =============================================================================
// 脚本对局表（SCRIPTED_GAME）
// =============================================================================

/// 缩微脚本对局：1.e4 e5 2.Qh5 Nc6 3.Bc4 Nf6?? 4.Qxf7#
///
/// 接受的输入：`e7e5`、`b8c6`、`g8f6`（按剧本顺序）、`q`（认输退出）；
/// 其余输入一律改写为非法走法标记并还原棋盘。
pub const SCRIPTED_GAME_JSON: &str = r#"[
  ["^$", "<"],
  ["^<$", "Moves: 1.e4\nEnter Your Move: "],
  ["(?s)^.*Enter Your Move: q\n$", "Quit.\nGame over.\n"],
  ["(?s)^(?:\\*Illegal Move\\* try again\n)?Moves: (.*)\nEnter Your Move: ([^\n]*)\n$", "%%\n#moves: \\1\n#input: \\2\n"],
  ["^%%\n#moves: (1\\.e4)\n#input: e7e5\n$", "Moves: \\1 e5 2.Qh5\nEnter Your Move: "],
  ["^%%\n#moves: (1\\.e4 e5 2\\.Qh5)\n#input: b8c6\n$", "Moves: \\1 Nc6 3.Bc4\nEnter Your Move: "],
  ["^%%\n#moves: (1\\.e4 e5 2\\.Qh5 Nc6 3\\.Bc4)\n#input: g8f6\n$", "Moves: \\1 Nf6 4.Qxf7#\n*Checkmate*\nYou win!\nGame over.\n"],
  ["(?s)^%%\n#moves: (.*)\n#input: [^\n]*\n$", "*Illegal Move* try again\nMoves: \\1\nEnter Your Move: "]
]"#;

// =============================================================================
// 单用途小表
// =============================================================================

/// 只做 bootstrap 的最小表
pub const BOOTSTRAP_JSON: &str = r#"[
  ["^$", "<"],
  ["^<$", "Enter Your Move: "]
]"#;

/// 对任何实际状态都零匹配的表（no-op 不变性测试用）
pub const NOOP_JSON: &str = r#"[
  ["\\x00never-matches\\x00", "unreachable"]
]"#;

/// 违反草稿清理约定的表：pass 结束后留下 %% 线程
pub const SCRATCH_LEAK_JSON: &str = r#"[
  ["^$", "%%\n#stack:\nleak\n"]
]"#;

lazy_static! {
    static ref SCRIPTED_GAME: Arc<RuleTable> = Arc::new(
        RuleTable::from_json_str(SCRIPTED_GAME_JSON).expect("fixture table must load")
    );
}

/// 预编译的脚本对局表（进程内共享）
pub fn scripted_game() -> Arc<RuleTable> {
    Arc::clone(&SCRIPTED_GAME)
}
