//! 重写规则
//!
//! 一条有序的 pattern/replacement 单元。pattern 是 regex 方言的
//! 文本模式，replacement 是引用捕获组的模板。
//!
//! 模板方言沿用工件格式：`\1`..`\99` 与 `\g<12>` 为组引用，
//! `\\` 为字面反斜杠；其余转义一律在 load 时报错。
//!
//! 匹配模式固定为：对 pre-rewrite 串做一次从左到右扫描，替换
//! 所有互不重叠的匹配，同一条规则内绝不重扫刚替换出来的文本。

use regex::{Captures, Regex};

use crate::types::{EngineError, LoadError};

/// 替换模板的一段
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    /// 组引用；0 表示整体匹配
    Group(usize),
}

/// 一条编译好的重写规则，load 之后不可变
#[derive(Debug, Clone)]
pub struct Rule {
    index: usize,
    pattern: String,
    replacement: String,
    regex: Regex,
    template: Vec<TemplatePart>,
}

impl Rule {
    /// 编译一条规则
    ///
    /// load 时静态校验：pattern 可编译、模板转义合法、每个组引用
    /// 都落在 pattern 的组数之内。index 仅用于错误报告。
    pub fn compile(index: usize, pattern: &str, replacement: &str) -> Result<Rule, LoadError> {
        let regex = Regex::new(pattern).map_err(|e| LoadError::BadPattern {
            index,
            message: e.to_string(),
        })?;

        let template = parse_template(index, replacement)?;

        // captures_len 包含第 0 组（整体匹配）
        let group_count = regex.captures_len() - 1;
        for part in &template {
            if let TemplatePart::Group(group) = part {
                if *group > group_count {
                    return Err(LoadError::BadGroupRef {
                        index,
                        group: *group,
                        group_count,
                    });
                }
            }
        }

        Ok(Rule {
            index,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            regex,
            template,
        })
    }

    /// 规则在表中的下标
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// 应用规则，返回新状态文本与替换次数
    ///
    /// 零匹配时原样返回（no-op，不是错误）。引用了未参与匹配的
    /// 捕获组是致命的 [`EngineError::Internal`]，绝不静默吞掉。
    pub fn apply(&self, state: &str) -> Result<(String, u64), EngineError> {
        let mut out = String::with_capacity(state.len());
        let mut last_end = 0;
        let mut rewrites = 0u64;

        for caps in self.regex.captures_iter(state) {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            out.push_str(&state[last_end..whole.start()]);
            self.expand(&caps, &mut out)?;
            last_end = whole.end();
            rewrites += 1;
        }

        if rewrites == 0 {
            return Ok((state.to_string(), 0));
        }

        out.push_str(&state[last_end..]);
        Ok((out, rewrites))
    }

    /// 按模板展开一次匹配
    fn expand(&self, caps: &Captures<'_>, out: &mut String) -> Result<(), EngineError> {
        for part in &self.template {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Group(group) => match caps.get(*group) {
                    Some(m) => out.push_str(m.as_str()),
                    None => {
                        return Err(EngineError::Internal {
                            rule_index: self.index,
                            group: *group,
                        })
                    }
                },
            }
        }
        Ok(())
    }
}

/// 解析替换模板
///
/// `\数字` 最多取两位（与工件的来源方言一致），`\g<数字>` 不限位数。
fn parse_template(index: usize, replacement: &str) -> Result<Vec<TemplatePart>, LoadError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = replacement.chars().peekable();

    let flush = |literal: &mut String, parts: &mut Vec<TemplatePart>| {
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(std::mem::take(literal)));
        }
    };

    while let Some(c) = chars.next() {
        if c != '\\' {
            literal.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('\\') => {
                chars.next();
                literal.push('\\');
            }
            Some(d) if d.is_ascii_digit() => {
                let mut group = 0usize;
                let mut taken = 0;
                while taken < 2 {
                    match chars.peek().copied() {
                        Some(d) if d.is_ascii_digit() => {
                            chars.next();
                            group = group * 10 + (d as usize - '0' as usize);
                            taken += 1;
                        }
                        _ => break,
                    }
                }
                flush(&mut literal, &mut parts);
                parts.push(TemplatePart::Group(group));
            }
            Some('g') => {
                chars.next();
                if chars.next() != Some('<') {
                    return Err(LoadError::BadEscape {
                        index,
                        escape: "\\g".to_string(),
                    });
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => {
                            return Err(LoadError::BadEscape {
                                index,
                                escape: format!("\\g<{}", digits),
                            })
                        }
                    }
                }
                let group = digits.parse::<usize>().map_err(|_| LoadError::BadEscape {
                    index,
                    escape: "\\g<>".to_string(),
                })?;
                flush(&mut literal, &mut parts);
                parts.push(TemplatePart::Group(group));
            }
            other => {
                let escape = match other {
                    Some(c) => format!("\\{}", c),
                    None => "\\".to_string(),
                };
                return Err(LoadError::BadEscape { index, escape });
            }
        }
    }

    flush(&mut literal, &mut parts);
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_when_zero_matches() {
        let rule = Rule::compile(0, "xyz", "replaced").unwrap();
        let (out, n) = rule.apply("no match here").unwrap();
        assert_eq!(out, "no match here");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_group_substitution() {
        let rule = Rule::compile(0, r"(\w+)=(\w+)", r"\2=\1").unwrap();
        let (out, n) = rule.apply("a=b c=d").unwrap();
        assert_eq!(out, "b=a d=c");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_g_angle_reference() {
        let rule = Rule::compile(0, r"(ab)c", r"\g<1>x").unwrap();
        let (out, _) = rule.apply("abc").unwrap();
        assert_eq!(out, "abx");
    }

    #[test]
    fn test_backreference_two_digit_limit() {
        // \12 是第 12 组，不是第 1 组加字面 '2'
        let pattern = r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)(l)";
        let rule = Rule::compile(0, pattern, r"\12\1").unwrap();
        let (out, _) = rule.apply("abcdefghijkl").unwrap();
        assert_eq!(out, "la");
    }

    #[test]
    fn test_literal_backslash() {
        let rule = Rule::compile(0, "a", r"\\n").unwrap();
        let (out, _) = rule.apply("a").unwrap();
        assert_eq!(out, "\\n");
    }

    #[test]
    fn test_no_rescan_of_substituted_text() {
        // 替换出来的 "ba" 不在同一次应用里被重扫
        let rule = Rule::compile(0, "ba", "ab").unwrap();
        let (out, n) = rule.apply("bba").unwrap();
        assert_eq!(out, "bab");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_nonoverlapping_left_to_right() {
        let rule = Rule::compile(0, "aa", "a").unwrap();
        let (out, n) = rule.apply("aaaa").unwrap();
        assert_eq!(out, "aa");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_empty_pattern_bootstrap() {
        // 工件的 bootstrap 惯例：^$ 在空串上恰好匹配一次
        let rule = Rule::compile(0, "^$", "<").unwrap();
        let (out, n) = rule.apply("").unwrap();
        assert_eq!(out, "<");
        assert_eq!(n, 1);

        let (out, n) = rule.apply("not empty").unwrap();
        assert_eq!(out, "not empty");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = Rule::compile(3, "(unclosed", "x").unwrap_err();
        assert!(matches!(err, LoadError::BadPattern { index: 3, .. }));
    }

    #[test]
    fn test_dangling_group_reference_rejected_at_compile() {
        // 3 个组的 pattern 引用 \9 必须在编译时失败，而不是匹配时
        let err = Rule::compile(5, r"(a)(b)(c)", r"\9").unwrap_err();
        assert_eq!(
            err,
            LoadError::BadGroupRef {
                index: 5,
                group: 9,
                group_count: 3
            }
        );
    }

    #[test]
    fn test_unknown_escape_rejected() {
        let err = Rule::compile(0, "a", r"\q").unwrap_err();
        assert!(matches!(err, LoadError::BadEscape { .. }));

        let err = Rule::compile(0, "a", "trailing\\").unwrap_err();
        assert!(matches!(err, LoadError::BadEscape { .. }));
    }

    #[test]
    fn test_unparticipating_group_is_internal_error() {
        // 组下标合法但该组在这次匹配里没参与：静态检查放行，
        // 运行期必须报 Internal 而不是静默替换
        let rule = Rule::compile(4, "(a)|(b)", r"\2").unwrap();
        let err = rule.apply("a").unwrap_err();
        assert_eq!(
            err,
            EngineError::Internal {
                rule_index: 4,
                group: 2
            }
        );
    }

    #[test]
    fn test_whole_match_group_zero() {
        let rule = Rule::compile(0, "ab", r"[\0]").unwrap();
        let (out, _) = rule.apply("xaby").unwrap();
        assert_eq!(out, "x[ab]y");
    }

    #[test]
    fn test_scratch_thread_rewrite() {
        // 工件式的线程变量改写：#var: value 行
        let rule = Rule::compile(0, r"(%%[^%]*#dst: )e4", r"\g<1>e5").unwrap();
        let state = "%%\n#stack:\n#src: e2\n#dst: e4\n";
        let (out, n) = rule.apply(state).unwrap();
        assert_eq!(out, "%%\n#stack:\n#src: e2\n#dst: e5\n");
        assert_eq!(n, 1);
    }
}
