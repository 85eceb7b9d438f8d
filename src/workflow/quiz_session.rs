//! 答题会话
//!
//! 持有一份测验和每道题的答案，负责导航、作答和生成提交数据。

use crate::error::{AppResult, QuizError};
use crate::models::quiz::{Quiz, QuizQuestion};

/// 提交给评测服务的数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// 题干，按题目顺序
    pub questions: Vec<String>,
    /// 答案，未作答为空字符串
    pub answers: Vec<String>,
    /// 题干 + 选项行，用于结果记录
    pub question_texts: Vec<String>,
}

/// 答题会话
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    answers: Vec<String>,
    current: usize,
}

impl QuizSession {
    /// 创建会话；空测验视为错误
    pub fn new(quiz: Quiz) -> AppResult<Self> {
        if quiz.is_empty() {
            return Err(QuizError::NoQuestions.into());
        }
        let answers = vec![String::new(); quiz.len()];
        Ok(Self {
            quiz,
            answers,
            current: 0,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn len(&self) -> usize {
        self.quiz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.quiz.questions()[self.current]
    }

    pub fn current_answer(&self) -> &str {
        &self.answers[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.len()
    }

    /// 前进到下一题，已是最后一题时返回 false
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// 回到上一题，已是第一题时返回 false
    pub fn prev(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn go_to(&mut self, index: usize) -> AppResult<()> {
        if index >= self.len() {
            return Err(QuizError::IndexOutOfRange {
                index,
                len: self.len(),
            }
            .into());
        }
        self.current = index;
        Ok(())
    }

    /// 当前进度（百分比）
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.len() as f64 * 100.0
    }

    /// 为当前题目作答
    pub fn set_answer(&mut self, value: impl Into<String>) -> AppResult<()> {
        self.answer_at(self.current, value)
    }

    /// 为指定题目作答
    ///
    /// 选择题的答案必须是选项之一；空字符串表示清除答案。
    pub fn answer_at(&mut self, index: usize, value: impl Into<String>) -> AppResult<()> {
        let question = self.quiz.get(index).ok_or(QuizError::IndexOutOfRange {
            index,
            len: self.quiz.len(),
        })?;

        let value = value.into();
        if let Some(options) = question.options() {
            let trimmed = value.trim();
            if !trimmed.is_empty() && !options.iter().any(|o| o == trimmed) {
                return Err(QuizError::InvalidOption {
                    index,
                    answer: value,
                }
                .into());
            }
            self.answers[index] = trimmed.to_string();
        } else {
            self.answers[index] = value;
        }
        Ok(())
    }

    /// 第一个未作答（空白）的题目索引
    pub fn first_unanswered(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.trim().is_empty())
    }

    /// 生成提交数据
    ///
    /// `require_all` 为 true 时，存在未作答题目会返回 [`QuizError::Incomplete`]。
    pub fn submission(&self, require_all: bool) -> AppResult<Submission> {
        if require_all {
            if let Some(index) = self.first_unanswered() {
                return Err(QuizError::Incomplete { index }.into());
            }
        }

        Ok(Submission {
            questions: self
                .quiz
                .iter()
                .map(|q| q.question().to_string())
                .collect(),
            answers: self.answers.clone(),
            question_texts: self.quiz.iter().map(|q| q.display_text()).collect(),
        })
    }
}
