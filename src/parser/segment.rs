//! 题块切分策略
//!
//! 多个 [`Segmenter`] 按顺序组成 [`SegmenterChain`]，依次尝试，
//! 第一个识别出自身格式约定的策略胜出。新的编号风格只需要新增一个实现。

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static QUESTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[0-9]+\.\s").expect("question start regex is invalid"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("blank line regex is invalid"));

/// 把整段文本切成若干题块
pub trait Segmenter: Send + Sync {
    /// 策略名称（仅用于日志）
    fn name(&self) -> &'static str;

    /// 切分文本，返回的题块均已 trim 且非空
    ///
    /// 文本不符合该策略的格式约定时返回 `None`，由链中的下一个策略接手。
    /// 符合约定但只有一个题块（例如只有一道题）时返回 `Some`。
    fn segment<'a>(&self, text: &'a str) -> Option<Vec<&'a str>>;
}

/// 按 `N.` 题号切分：在每个以题号开头的行之前断开
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedSegmenter;

impl Segmenter for NumberedSegmenter {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn segment<'a>(&self, text: &'a str) -> Option<Vec<&'a str>> {
        let mut starts: Vec<usize> = QUESTION_START.find_iter(text).map(|m| m.start()).collect();
        if starts.is_empty() {
            return None;
        }
        if starts.first() != Some(&0) {
            // 第一个题号之前的内容也是一个题块
            starts.insert(0, 0);
        }

        let mut blocks = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            push_non_empty(&mut blocks, &text[start..end]);
        }
        Some(blocks)
    }
}

/// 按空行分段切分
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSegmenter;

impl Segmenter for ParagraphSegmenter {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn segment<'a>(&self, text: &'a str) -> Option<Vec<&'a str>> {
        if !BLANK_LINES.is_match(text.trim()) {
            return None;
        }

        let mut blocks = Vec::new();
        for paragraph in BLANK_LINES.split(text) {
            push_non_empty(&mut blocks, paragraph);
        }
        Some(blocks)
    }
}

fn push_non_empty<'a>(blocks: &mut Vec<&'a str>, block: &'a str) {
    let block = block.trim();
    if !block.is_empty() {
        blocks.push(block);
    }
}

/// 切分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation<'a> {
    /// 最终采用的策略
    pub strategy: &'static str,
    pub blocks: Vec<&'a str>,
}

/// 按顺序尝试的切分策略链
pub struct SegmenterChain {
    segmenters: Vec<Box<dyn Segmenter>>,
}

impl SegmenterChain {
    pub fn new(segmenters: Vec<Box<dyn Segmenter>>) -> Self {
        Self { segmenters }
    }

    /// 依次尝试每个策略，返回第一个识别出自身格式的结果
    ///
    /// 识别出格式的策略即使只切出一个题块也直接采用，避免把一道完整的题拆散；
    /// 全部不识别时整段文本作为一个题块。
    pub fn segment<'a>(&self, text: &'a str) -> Segmentation<'a> {
        for segmenter in &self.segmenters {
            match segmenter.segment(text) {
                Some(blocks) => {
                    debug!("切分策略 {} 得到 {} 个题块", segmenter.name(), blocks.len());
                    return Segmentation {
                        strategy: segmenter.name(),
                        blocks,
                    };
                }
                None => debug!("切分策略 {} 不适用", segmenter.name()),
            }
        }

        let mut blocks = Vec::new();
        push_non_empty(&mut blocks, text);
        Segmentation {
            strategy: "whole",
            blocks,
        }
    }
}

impl Default for SegmenterChain {
    fn default() -> Self {
        Self::new(vec![Box::new(NumberedSegmenter), Box::new(ParagraphSegmenter)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_split_keeps_preamble() {
        let text = "Safety quiz\n1. First question here\nA) x\n12. Second question here";
        let blocks = NumberedSegmenter.segment(text).unwrap();
        assert_eq!(
            blocks,
            vec![
                "Safety quiz",
                "1. First question here\nA) x",
                "12. Second question here"
            ]
        );
    }

    #[test]
    fn test_numbered_ignores_mid_line_numbers() {
        let text = "Keep a 2. metre gap\nand stand 3.5 m back";
        assert_eq!(NumberedSegmenter.segment(text), None);
    }

    #[test]
    fn test_numbered_only_ascii_digits() {
        let text = "١. What is PPE here?\n٢. Describe the route.";
        assert_eq!(NumberedSegmenter.segment(text), None);
    }

    #[test]
    fn test_paragraph_split() {
        let text = "First paragraph\nstill first\n\n \n\nSecond paragraph";
        assert_eq!(
            ParagraphSegmenter.segment(text).unwrap(),
            vec!["First paragraph\nstill first", "Second paragraph"]
        );
        assert_eq!(ParagraphSegmenter.segment("one line\nanother line"), None);
    }

    #[test]
    fn test_chain_prefers_numbered() {
        let text = "1. What is PPE?\n\nA) Shoes\nB) Helmet\n\n2. Describe the route.";
        let seg = SegmenterChain::default().segment(text);
        assert_eq!(seg.strategy, "numbered");
        assert_eq!(seg.blocks.len(), 2);
    }

    #[test]
    fn test_chain_keeps_single_numbered_question_whole() {
        let text = "1. What is PPE?\n\nA) Shoes\nB) Helmet";
        let seg = SegmenterChain::default().segment(text);
        assert_eq!(seg.strategy, "numbered");
        assert_eq!(seg.blocks, vec![text]);
    }

    #[test]
    fn test_chain_falls_back_to_paragraphs() {
        let text = "What is PPE?\nA) Shoes\nB) Helmet\n\nDescribe the route.";
        let seg = SegmenterChain::default().segment(text);
        assert_eq!(seg.strategy, "paragraph");
        assert_eq!(seg.blocks, vec!["What is PPE?\nA) Shoes\nB) Helmet", "Describe the route."]);
    }

    #[test]
    fn test_chain_unrecognized_text_is_one_block() {
        let seg = SegmenterChain::default().segment("just one run-on sentence");
        assert_eq!(seg.strategy, "whole");
        assert_eq!(seg.blocks, vec!["just one run-on sentence"]);
    }

    #[test]
    fn test_empty_chain_returns_whole_text() {
        let seg = SegmenterChain::new(Vec::new()).segment("  whole text  ");
        assert_eq!(seg.strategy, "whole");
        assert_eq!(seg.blocks, vec!["whole text"]);
        assert!(SegmenterChain::new(Vec::new()).segment("").blocks.is_empty());
    }
}
