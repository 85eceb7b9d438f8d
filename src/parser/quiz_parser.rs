//! 测验文本解析器
//!
//! 把 LLM 返回的自由文本转换为有序的 [`Quiz`]。
//! 解析过程不会失败：无法识别的题块被丢弃，完全失败时返回空测验，由调用方决定如何处理。

use tracing::debug;

use super::block::parse_block;
use super::segment::{Segmenter, SegmenterChain};
use crate::models::quiz::Quiz;
use crate::utils::logging::truncate_text;

/// 测验文本解析器（无状态）
#[derive(Default)]
pub struct QuizTextParser {
    chain: SegmenterChain,
}

impl QuizTextParser {
    /// 默认策略链：先按 `N.` 题号切分，失败再按空行分段
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义切分策略链
    pub fn with_segmenters(segmenters: Vec<Box<dyn Segmenter>>) -> Self {
        Self {
            chain: SegmenterChain::new(segmenters),
        }
    }

    /// 解析原始文本
    pub fn parse(&self, raw_text: &str) -> Quiz {
        let text = normalize(raw_text);
        let segmentation = self.chain.segment(&text);

        let mut questions = Vec::with_capacity(segmentation.blocks.len());
        for block in &segmentation.blocks {
            match parse_block(block) {
                Some(question) => questions.push(question),
                None => debug!("丢弃题块: {}", truncate_text(block, 40)),
            }
        }

        debug!(
            "解析完成 (策略: {}): {} 个题块 -> {} 道题目",
            segmentation.strategy,
            segmentation.blocks.len(),
            questions.len()
        );

        Quiz::new(questions)
    }
}

/// 统一换行符并去掉首尾空白
fn normalize(raw_text: &str) -> String {
    raw_text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// 使用默认解析器解析测验文本
pub fn parse_quiz(raw_text: &str) -> Quiz {
    QuizTextParser::new().parse(raw_text)
}
