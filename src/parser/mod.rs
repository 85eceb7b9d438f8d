pub mod block;
pub mod line;
pub mod quiz_parser;
pub mod segment;

pub use quiz_parser::{parse_quiz, QuizTextParser};
pub use segment::{NumberedSegmenter, ParagraphSegmenter, Segmenter, SegmenterChain};
