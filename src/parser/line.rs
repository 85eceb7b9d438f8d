//! 行分类器
//!
//! 每一行只可能是三类之一：空行、选项行、普通文本行。
//! 选项标记统一采用宽松规则：`A`-`D`（不区分大小写）+ `)` 或 `.` + 空白 + 选项内容。

use regex::Regex;
use std::sync::LazyLock;

static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Da-d])[).]\s+(\S.*)$").expect("option marker regex is invalid")
});

static QUESTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+").expect("question number regex is invalid"));

/// 单行的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// 空白行
    Blank,
    /// 选项行，携带去掉标记后的选项文本
    Option(&'a str),
    /// 普通文本行（已 trim）
    Text(&'a str),
}

/// 对一行文本分类
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    match OPTION_LINE.captures(line).and_then(|caps| caps.get(2)) {
        Some(text) => LineKind::Option(text.as_str().trim_end()),
        None => LineKind::Text(line),
    }
}

/// 去掉行首的 `N.` 题号
pub fn strip_question_number(text: &str) -> &str {
    let text = text.trim();
    match QUESTION_NUMBER.find(text) {
        Some(m) => text[m.end()..].trim(),
        None => text,
    }
}
