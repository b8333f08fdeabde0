//! 游戏状态编码
//!
//! 整个对局状态就是一个文本串，没有棋盘数组、没有走法生成器。
//! 按约定（而非解析出的结构）划分为三个区域：
//!
//! - 棋盘区：棋子摆放与行棋方的可读显示（由规则表自己渲染）
//! - 元数据区：易位权、过路兵目标等，如 `[Castling Rights: KQkq, En Passant: -]`
//! - 草稿区：仅在一次 pass 内存活的临时标记（候选走法、分数、搜索深度），
//!   以 `%%` 开头的线程块加 `#name: value` 变量行的形式出现
//!
//! 两次 tick 之间草稿区必须为空——只有棋盘区和元数据区是持久状态。
//! 清理草稿是规则表的义务，引擎只提供检测。
//!
//! 除了下面两个谓词之外不存在任何结构化解码：编解码器从不构造
//! 棋盘对象，外部输入也只经 [`GameState::append_input`] 进入系统。

use std::fmt;

/// 终局标记：状态中出现该子串即视为对局结束
///
/// 只允许由规则引入，绝不允许由外部输入引入。
pub const TERMINAL_MARKER: &str = "Game over";

/// 草稿线程起始标记
pub const THREAD_MARKER: &str = "%%";

/// 非法走法标记（由规则表在识别出非法输入时写入）
pub const ILLEGAL_MOVE_MARKER: &str = "*Illegal Move*";

/// 将杀标记
pub const CHECKMATE_MARKER: &str = "*Checkmate*";

/// 对局状态：一个在重写之间不可变的文本值
///
/// TurnCycle 独占持有当前值；所有接口按值转移所有权而不是共享可变。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState(String);

impl GameState {
    /// 新对局的规范起始状态
    ///
    /// 是空串：初始棋盘显示由规则表的 bootstrap 规则（`^$` 匹配）
    /// 在第一次 pass 中自行渲染，引擎不内置任何棋盘知识。
    pub fn new() -> Self {
        GameState(String::new())
    }

    /// 从已有文本构造（用于调试工具与测试）
    pub fn from_text(text: impl Into<String>) -> Self {
        GameState(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_text(self) -> String {
        self.0
    }

    /// 终局判定：纯子串包含，不锚定、不解析
    pub fn is_terminal(&self) -> bool {
        self.0.contains(TERMINAL_MARKER)
    }

    /// 追加一行外部输入（对手走法的文本记法）
    ///
    /// 这是外部输入进入系统的唯一通道。不做任何校验——
    /// 非法输入由规则表自己的规则识别并改写，引擎不管。
    pub fn append_input(self, token: &str) -> GameState {
        let mut text = self.0;
        text.push_str(token);
        text.push('\n');
        GameState(text)
    }

    /// 草稿区是否残留
    ///
    /// 检测 `%%` 线程标记或 `#name: value` 变量行。在
    /// AwaitingOpponentInput 边界上返回 true 说明规则表违反了
    /// 清理约定。
    pub fn has_scratch(&self) -> bool {
        self.0.contains(THREAD_MARKER) || self.0.lines().any(|line| line.starts_with('#'))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = GameState::new();
        assert_eq!(state.as_str(), "");
        assert!(!state.is_terminal());
        assert!(!state.has_scratch());
    }

    #[test]
    fn test_terminal_is_substring_containment() {
        let state = GameState::from_text("*Checkmate*\nYou win!\nGame over.\n");
        assert!(state.is_terminal());

        // 不锚定：标记出现在中间也算
        let state = GameState::from_text("prefix Game over suffix");
        assert!(state.is_terminal());

        let state = GameState::from_text("Enter Your Move: ");
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_append_input_is_newline_terminated() {
        let state = GameState::from_text("Enter Your Move: ");
        let state = state.append_input("e2e4");
        assert_eq!(state.as_str(), "Enter Your Move: e2e4\n");
    }

    #[test]
    fn test_terminal_survives_further_input() {
        // 终局幂等：输入本身不跑规则，标记不会被移除
        let state = GameState::from_text("Game over.\n");
        let state = state.append_input("e2e4");
        assert!(state.is_terminal());
        let state = state.append_input("anything at all");
        assert!(state.is_terminal());
    }

    #[test]
    fn test_scratch_detection() {
        let clean = GameState::from_text("board display\n[Castling Rights: KQkq, En Passant: -]\nEnter Your Move: ");
        assert!(!clean.has_scratch());

        let thread = GameState::from_text("%%\n#stack:\nTrue\n");
        assert!(thread.has_scratch());

        let var_line = GameState::from_text("board\n#after_move: rnbq\n");
        assert!(var_line.has_scratch());
    }
}
