//! 规则表加载与校验
//!
//! 规则表是外部创作、带版本的工件（类似编译好的字节码），
//! 进程生命周期内加载一次，之后不可变。不支持热加载——
//! 对局中途换表会悄悄破坏草稿区约定。
//!
//! 工件格式：JSON 数组，每个元素是 `[pattern, replacement]` 两元素
//! 字符串数组。只有顺序和这两个字符串字段是承载语义的。

use std::fs;
use std::path::Path;

use log::info;

use crate::rule::Rule;
use crate::types::LoadError;

/// 有序不可变的规则序列
///
/// 顺序即程序：运行期绝不重排。表在 load 后只读，可以安全地在
/// 多局对弈之间共享。
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// 从有序 (pattern, replacement) 对构建
    ///
    /// 逐条编译校验；第一条非法规则即以 [`LoadError`]（带规则下标）
    /// 拒绝整张表。空表同样拒绝。
    pub fn from_pairs<I, S>(pairs: I) -> Result<RuleTable, LoadError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for (index, (pattern, replacement)) in pairs.into_iter().enumerate() {
            rules.push(Rule::compile(index, pattern.as_ref(), replacement.as_ref())?);
        }
        if rules.is_empty() {
            return Err(LoadError::EmptyTable);
        }
        Ok(RuleTable { rules })
    }

    /// 从 JSON 工件文本解析
    pub fn from_json_str(json: &str) -> Result<RuleTable, LoadError> {
        let pairs: Vec<(String, String)> =
            serde_json::from_str(json).map_err(|e| LoadError::BadArtifact {
                message: e.to_string(),
            })?;
        Self::from_pairs(pairs)
    }

    /// 从文件加载工件
    pub fn load(path: impl AsRef<Path>) -> Result<RuleTable, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LoadError::BadArtifact {
            message: format!("{}: {}", path.display(), e),
        })?;
        let table = Self::from_json_str(&text)?;
        info!("loaded rule table: {} rules from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}
