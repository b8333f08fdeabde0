//! 核心类型定义
//!
//! 错误分类与回合状态机的基础类型

use std::error::Error;
use std::fmt;

/// 规则表加载错误
///
/// 全部在 load 阶段检测：任何一条规则非法，整张表都会被拒绝，
/// 对局无法开始。index 为出错规则在表中的下标（从 0 开始）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// pattern 无法在引擎方言下编译
    BadPattern { index: usize, message: String },
    /// 替换模板引用了 pattern 中不存在的捕获组
    BadGroupRef {
        index: usize,
        group: usize,
        group_count: usize,
    },
    /// 替换模板中出现无法识别的转义序列
    BadEscape { index: usize, escape: String },
    /// 规则表为空
    EmptyTable,
    /// 工件无法读取，或不是合法的 JSON 对序列
    BadArtifact { message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::BadPattern { index, message } => {
                write!(f, "rule {}: invalid pattern: {}", index, message)
            }
            LoadError::BadGroupRef {
                index,
                group,
                group_count,
            } => write!(
                f,
                "rule {}: replacement references group {} but the pattern defines only {}",
                index, group, group_count
            ),
            LoadError::BadEscape { index, escape } => {
                write!(f, "rule {}: unknown escape '{}' in replacement", index, escape)
            }
            LoadError::EmptyTable => write!(f, "rule table is empty"),
            LoadError::BadArtifact { message } => write!(f, "invalid artifact: {}", message),
        }
    }
}

impl Error for LoadError {}

/// 引擎运行期错误
///
/// 单次 tick 的失败以类型化错误上报，绝不以一个改写到一半的
/// 状态呈现给调用方。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 对局已结束（或已因致命错误作废），不再接受 tick
    Terminated,
    /// 一次 pass 超出调用方给定的时间上限，该对局作废
    Timeout { elapsed_ms: u64, limit_ms: u64 },
    /// AwaitingOpponentInput 阶段 tick 时未提供输入
    MissingInput,
    /// AwaitingEngineMove 阶段 tick 时多余地提供了输入
    UnexpectedInput,
    /// 替换时引用了未参与本次匹配的捕获组
    ///
    /// 组下标合法性在 load 时静态检查过；某个组在具体匹配中
    /// 未参与是无法完全静态排除的情形，属于规则表缺陷，致命。
    Internal { rule_index: usize, group: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Terminated => write!(f, "engine terminated: game is over"),
            EngineError::Timeout {
                elapsed_ms,
                limit_ms,
            } => write!(
                f,
                "pass exceeded time limit: {}ms > {}ms",
                elapsed_ms, limit_ms
            ),
            EngineError::MissingInput => {
                write!(f, "awaiting opponent input but none was supplied")
            }
            EngineError::UnexpectedInput => {
                write!(f, "awaiting engine move but input was supplied")
            }
            EngineError::Internal { rule_index, group } => write!(
                f,
                "internal engine error: rule {} substituted group {} which did not match",
                rule_index, group
            ),
        }
    }
}

impl Error for EngineError {}

/// 回合状态机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 下一次 tick 执行引擎走子（跑一次 pass）
    AwaitingEngineMove,
    /// 等待对手的一行文本输入
    AwaitingOpponentInput,
    /// 终局：状态中出现了终局标记
    Terminal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingEngineMove => "awaiting_engine_move",
            Phase::AwaitingOpponentInput => "awaiting_opponent_input",
            Phase::Terminal => "terminal",
        };
        write!(f, "{}", name)
    }
}

/// 一次 tick 的结果快照
#[derive(Debug, Clone)]
pub struct TickReport {
    /// pass 之后的完整状态文本
    pub state: String,
    /// 状态中是否出现终局标记
    pub terminal: bool,
    /// 本次 pass 中产生过替换的规则条数
    pub rules_fired: u64,
    /// 本次 pass 中的替换总次数
    pub rewrites: u64,
    /// 本次 pass 耗时（毫秒）
    pub elapsed_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display_names_rule_index() {
        let err = LoadError::BadGroupRef {
            index: 7,
            group: 9,
            group_count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("rule 7"));
        assert!(msg.contains("group 9"));
        assert!(msg.contains("only 3"));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Timeout {
            elapsed_ms: 5200,
            limit_ms: 3000,
        };
        assert!(err.to_string().contains("5200ms"));
        assert_eq!(
            EngineError::Terminated.to_string(),
            "engine terminated: game is over"
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::AwaitingEngineMove.to_string(), "awaiting_engine_move");
        assert_eq!(Phase::Terminal.to_string(), "terminal");
    }
}
