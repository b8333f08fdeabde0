//! Regex Chess 重写引擎
//!
//! 用一串有序的 pattern/replacement 重写规则下棋：整个对局状态是
//! 一个文本串，没有棋盘数组、没有走法生成函数、没有显式搜索树。
//! 合法性检查、走法生成、局面评估和固定深度的对抗搜索，全部是
//! 按序应用文本重写规则的涌现效果——引擎本身只是一台极小的
//! 项重写虚拟机，"程序"是外部工件里的规则表，"内存"是那个
//! 不断演化的字符串。

pub mod engine;
pub mod rule;
pub mod state;
pub mod table;
pub mod test_tables;
pub mod types;

pub use engine::{
    get_rewrite_count, get_rules_fired, reset_rewrite_count, reset_rules_fired, run_pass,
    EngineConfig, TurnCycle,
};
pub use rule::Rule;
pub use state::{
    GameState, CHECKMATE_MARKER, ILLEGAL_MOVE_MARKER, TERMINAL_MARKER, THREAD_MARKER,
};
pub use table::RuleTable;
pub use types::{EngineError, LoadError, Phase, TickReport};
