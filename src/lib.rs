//! # Safety Quiz
//!
//! 根据用户画像由 LLM 生成安全测验，解析、作答并评分
//!
//! ## 架构设计
//!
//! ### ① 解析层（Parser）
//! - `parser/` - 纯函数，把 LLM 原始文本解析为 [`Quiz`]
//! - `SegmenterChain` - 题块切分策略链（`N.` 题号 → 空行分段）
//! - `BlockAccumulator` - 单个题块的题干/选项状态机
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LlmService` - 生成测验、评测答案、合规报告、课程推荐
//! - `FailureWriter` - 记录解析失败的原始文本
//!
//! ### ③ 流程层（Workflow）
//! - `QuizFlow` - 生成 → 解析 → 重试 → 评测 → 报告
//! - `QuizSession` - 答题状态（导航、作答、提交）
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, QuizError};
pub use models::{ProfileData, QuestionType, Quiz, QuizQuestion, QuizResult, SafetyReport};
pub use parser::{parse_quiz, QuizTextParser};
pub use services::LlmService;
pub use workflow::{QuizFlow, QuizSession};
