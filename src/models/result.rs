use serde::{Deserialize, Serialize};

/// 评测服务返回的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 总分，百分制 0-100
    pub score: f64,
    /// 每道题的反馈，长度与题目数一致
    pub feedback: Vec<String>,
}

/// 及格分数线（含）
pub const PASSING_SCORE: f64 = 75.0;

/// 最终测验结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub feedback: Vec<String>,
    pub user_answers: Vec<String>,
    /// 题干 + 选项行
    pub questions: Vec<String>,
}

impl QuizResult {
    /// 是否达到及格线
    pub fn passed(&self) -> bool {
        self.score >= PASSING_SCORE
    }

    /// 分数与全部反馈拼成的一段摘要，供后续报告使用
    pub fn summary(&self) -> String {
        format!("Score: {}. Feedback: {}", self.score, self.feedback.join(" "))
    }
}
