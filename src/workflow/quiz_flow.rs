//! 测验流程 - 流程层
//!
//! 核心职责：定义"一次测验"的完整流程
//!
//! 流程顺序：
//! 1. 生成原始文本 → 解析 → 为空则记录并重试
//! 2. 答题会话（由调用方驱动）
//! 3. 提交 → 评测 → 组装结果
//! 4. 合规报告 + 课程推荐（并发）

use anyhow::Result;
use std::future::Future;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, QuizError};
use crate::models::{ComplianceReport, Course, EvaluationResult, ProfileData, QuizResult, SafetyReport};
use crate::parser::QuizTextParser;
use crate::services::{FailureWriter, LlmService};
use crate::utils::logging::log_quiz_loaded;
use crate::utils::truncate_text;
use crate::workflow::quiz_session::QuizSession;

/// 测验生成能力
pub trait QuizGenerator {
    /// 返回 LLM 生成的原始测验文本
    fn generate(&self, profile: &ProfileData) -> impl Future<Output = Result<String>>;
}

/// 答案评测能力
pub trait QuizEvaluator {
    fn evaluate(
        &self,
        profile: &ProfileData,
        questions: &[String],
        answers: &[String],
    ) -> impl Future<Output = Result<EvaluationResult>>;
}

/// 评测后的报告能力
pub trait QuizReporter {
    fn compliance_report(
        &self,
        profile: &ProfileData,
        score: f64,
        strengths: &str,
        weaknesses: &str,
    ) -> impl Future<Output = Result<ComplianceReport>>;

    fn recommend_courses(
        &self,
        job_role: &str,
        result: &QuizResult,
    ) -> impl Future<Output = Result<Vec<Course>>>;
}

/// 未单独总结优缺点时交给模型自行从分数推断
const INFER_FROM_FEEDBACK: &str = "Identified from feedback";

impl QuizGenerator for LlmService {
    async fn generate(&self, profile: &ProfileData) -> Result<String> {
        self.generate_quiz(profile).await
    }
}

impl QuizEvaluator for LlmService {
    async fn evaluate(
        &self,
        profile: &ProfileData,
        questions: &[String],
        answers: &[String],
    ) -> Result<EvaluationResult> {
        self.evaluate_quiz(profile, questions, answers).await
    }
}

impl QuizReporter for LlmService {
    async fn compliance_report(
        &self,
        profile: &ProfileData,
        score: f64,
        strengths: &str,
        weaknesses: &str,
    ) -> Result<ComplianceReport> {
        self.generate_compliance_report(profile, score, strengths, weaknesses)
            .await
    }

    async fn recommend_courses(&self, job_role: &str, result: &QuizResult) -> Result<Vec<Course>> {
        LlmService::recommend_courses(self, job_role, result).await
    }
}

/// 测验流程
///
/// - 编排生成、解析、重试与评测
/// - 不持有答题状态（由 [`QuizSession`] 持有）
pub struct QuizFlow<S> {
    service: S,
    parser: QuizTextParser,
    failure_writer: Option<FailureWriter>,
    max_attempts: usize,
}

impl<S> QuizFlow<S>
where
    S: QuizGenerator + QuizEvaluator,
{
    pub fn new(service: S, config: &Config) -> Self {
        Self {
            service,
            parser: QuizTextParser::new(),
            failure_writer: Some(FailureWriter::with_path(&config.failure_log_file)),
            max_attempts: config.max_generation_attempts.max(1),
        }
    }

    /// 不记录解析失败的原始文本
    pub fn without_failure_log(mut self) -> Self {
        self.failure_writer = None;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// 生成并解析测验，返回答题会话
    ///
    /// 解析结果为空时记录原文并重新生成，最多 `max_attempts` 次；
    /// 仍然为空则返回 [`QuizError::EmptyQuiz`]。全部尝试都是调用失败时返回最后一次的错误。
    pub async fn prepare(&self, profile: &ProfileData) -> Result<QuizSession> {
        let mut last_error = None;
        let mut empty_results = 0;

        for attempt in 1..=self.max_attempts {
            info!(
                "📝 正在生成测验 {} (第 {}/{} 次)...",
                profile, attempt, self.max_attempts
            );

            let raw = match self.service.generate(profile).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!("测验生成失败 (第 {} 次): {}", attempt, e);
                    last_error = Some(e);
                    continue;
                }
            };

            let quiz = self.parser.parse(&raw);
            if !quiz.is_empty() {
                log_quiz_loaded(&quiz, attempt);
                return Ok(QuizSession::new(quiz)?);
            }

            empty_results += 1;
            warn!(
                "⚠️ 第 {} 次生成未解析出任何题目: {}",
                attempt,
                truncate_text(&raw, 80)
            );
            if let Some(writer) = &self.failure_writer {
                if let Err(e) = writer.write(attempt, &raw) {
                    warn!("写入解析失败记录失败: {}", e);
                }
            }
        }

        match last_error {
            Some(e) if empty_results == 0 => Err(e),
            _ => Err(AppError::Quiz(QuizError::EmptyQuiz {
                attempts: self.max_attempts,
            })
            .into()),
        }
    }

    /// 提交答案并评测
    pub async fn evaluate(
        &self,
        profile: &ProfileData,
        session: &QuizSession,
        require_all: bool,
    ) -> Result<QuizResult> {
        let submission = session.submission(require_all)?;

        info!("📤 正在提交 {} 道题目进行评测...", submission.questions.len());

        let evaluation = self
            .service
            .evaluate(profile, &submission.questions, &submission.answers)
            .await?;

        Ok(QuizResult {
            score: evaluation.score,
            feedback: evaluation.feedback,
            user_answers: submission.answers,
            questions: submission.question_texts,
        })
    }
}

impl<S> QuizFlow<S>
where
    S: QuizReporter,
{
    /// 根据评测结果生成合规报告与课程推荐
    ///
    /// 两次调用并发执行，任一失败则整体失败。
    pub async fn report(&self, profile: &ProfileData, result: &QuizResult) -> Result<SafetyReport> {
        info!(
            "📋 正在生成合规报告与课程推荐 (得分 {:.0}, {})...",
            result.score,
            if result.passed() { "及格" } else { "不及格" }
        );

        let (compliance, courses) = tokio::try_join!(
            self.service.compliance_report(
                profile,
                result.score,
                INFER_FROM_FEEDBACK,
                INFER_FROM_FEEDBACK
            ),
            self.service.recommend_courses(&profile.job_role, result),
        )?;

        info!("✓ 报告生成完成，推荐课程 {} 门", courses.len());
        Ok(SafetyReport {
            compliance,
            courses,
        })
    }
}
