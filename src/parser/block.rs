//! 单个题块的有限状态累加器
//!
//! 状态只有两个：
//! - `Stem`：累加题干，直到遇到第一个选项行
//! - `Options`：此后只收集选项行，其余文本行忽略

use tracing::debug;

use super::line::{classify, strip_question_number, LineKind};
use crate::models::quiz::QuizQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stem,
    Options,
}

#[derive(Debug)]
pub struct BlockAccumulator<'a> {
    state: State,
    stem_lines: Vec<&'a str>,
    options: Vec<&'a str>,
    ignored: usize,
}

impl<'a> BlockAccumulator<'a> {
    pub fn new() -> Self {
        Self {
            state: State::Stem,
            stem_lines: Vec::new(),
            options: Vec::new(),
            ignored: 0,
        }
    }

    pub fn push(&mut self, line: &'a str) {
        match (self.state, classify(line)) {
            (_, LineKind::Blank) => {}
            (_, LineKind::Option(text)) => {
                self.state = State::Options;
                self.options.push(text);
            }
            (State::Stem, LineKind::Text(text)) => self.stem_lines.push(text),
            (State::Options, LineKind::Text(_)) => self.ignored += 1,
        }
    }

    /// 选项区之后被忽略的文本行数
    pub fn ignored_lines(&self) -> usize {
        self.ignored
    }

    /// 题干：多行用单个空格拼接，并去掉题号
    pub fn stem(&self) -> String {
        strip_question_number(&self.stem_lines.join(" ")).to_string()
    }

    pub fn finish(self) -> Option<QuizQuestion> {
        let stem = self.stem();
        let options = self.options.into_iter().map(str::to_string).collect();
        QuizQuestion::from_parts(&stem, options)
    }
}

impl Default for BlockAccumulator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析单个题块；题干过短时返回 `None`
pub fn parse_block(block: &str) -> Option<QuizQuestion> {
    let mut acc = BlockAccumulator::new();
    for line in block.lines() {
        acc.push(line);
    }
    if acc.ignored_lines() > 0 {
        debug!("题块选项区中有 {} 行文本被忽略", acc.ignored_lines());
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    #[test]
    fn test_multiline_stem_before_options() {
        let q = parse_block(
            "3. When working at height\nabove two metres, what must you wear?\n\nA) A harness\nB) Sandals",
        )
        .unwrap();
        assert_eq!(
            q.question(),
            "When working at height above two metres, what must you wear?"
        );
        assert_eq!(
            q.options().unwrap(),
            &["A harness".to_string(), "Sandals".to_string()]
        );
    }

    #[test]
    fn test_text_after_options_is_ignored() {
        let mut acc = BlockAccumulator::new();
        for line in "1. Pick the extinguisher\nA) Water\nwrapped option text\nB) CO2\nAnswer: B".lines() {
            acc.push(line);
        }
        assert_eq!(acc.ignored_lines(), 2);
        let q = acc.finish().unwrap();
        assert_eq!(q.question(), "Pick the extinguisher");
        assert_eq!(q.options().unwrap().len(), 2);
    }

    #[test]
    fn test_markers_beyond_d_fold_into_stem() {
        let q = parse_block("1. Which is safest?\nE) not an option\nA) Ladder\nB) Scaffold\nF) ignored").unwrap();
        assert_eq!(q.question(), "Which is safest? E) not an option");
        assert_eq!(q.options().unwrap(), &["Ladder".to_string(), "Scaffold".to_string()]);
    }

    #[test]
    fn test_single_option_is_text_question() {
        let q = parse_block("4. Describe a near miss.\nA) For example a slip").unwrap();
        assert_eq!(q.question_type(), QuestionType::Text);
        assert!(q.options().is_none());
        assert_eq!(q.question(), "Describe a near miss.");
    }

    #[test]
    fn test_short_or_missing_stem_is_dropped() {
        assert!(parse_block("5. Why?").is_none());
        assert!(parse_block("---").is_none());
        // 第一行就是选项，题干为空
        assert!(parse_block("A) Shoes\nB) Helmet").is_none());
    }

    #[test]
    fn test_blank_lines_around_block() {
        let q = parse_block("\n\n  2. Name two fire exits \n\n").unwrap();
        assert_eq!(q.question(), "Name two fire exits");
    }
}
