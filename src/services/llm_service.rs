//! LLM 服务 - 业务能力层
//!
//! 只负责"生成测验"、"评测答案"、"合规报告"和"课程推荐"几种能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, BoxError, LlmError};
use crate::models::{ComplianceReport, Course, EvaluationResult, ProfileData, QuizResult};
use crate::utils::truncate_text;

/// LLM 服务
///
/// 职责：
/// - 根据用户画像生成测验原始文本（不做解析）
/// - 根据题目和答案请求评分与反馈
/// - 根据评分生成合规报告与课程推荐
/// - 不持有测验状态
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `max_tokens`: 最大输出长度
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已 trim）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }

    /// 根据用户画像生成测验原始文本
    pub async fn generate_quiz(&self, profile: &ProfileData) -> Result<String> {
        let (user_message, system_message) = self.build_quiz_messages(profile);
        self.send_to_llm(&user_message, Some(&system_message), 2048)
            .await
    }

    /// 评测答案，返回分数与逐题反馈
    ///
    /// `questions` 与 `answers` 一一对应，空答案会被要求反馈 "No answer was provided."
    pub async fn evaluate_quiz(
        &self,
        profile: &ProfileData,
        questions: &[String],
        answers: &[String],
    ) -> Result<EvaluationResult> {
        let (user_message, system_message) =
            self.build_evaluation_messages(profile, questions, answers);

        let response = self
            .send_to_llm(&user_message, Some(&system_message), 2048)
            .await?;

        let result = self.parse_evaluation_response(&response, questions.len())?;
        debug!(
            "评测完成: 得分 {:.1}, 反馈 {} 条",
            result.score,
            result.feedback.len()
        );
        Ok(result)
    }

    /// 构建生成测验的消息
    ///
    /// 返回 (user_message, system_message)
    fn build_quiz_messages(&self, profile: &ProfileData) -> (String, String) {
        let system_message = "You are a workplace safety expert who writes short, practical safety quizzes.".to_string();

        let user_message = format!(
            r#"Generate a safety quiz tailored to the following information:

Company Type: {}
Job Role: {}
Job Description: {}

Formatting rules (the quiz is parsed by a computer):
- Number every question as "1.", "2.", ... at the start of its line.
- Multiple-choice questions list their options on separate lines as "A)", "B)", "C)", "D)".
- Open questions have no options.
- Do not include a title, answers, or any other commentary."#,
            profile.company_type, profile.job_role, profile.job_description
        );

        (user_message, system_message)
    }

    /// 构建评测的消息
    ///
    /// 返回 (user_message, system_message)
    fn build_evaluation_messages(
        &self,
        profile: &ProfileData,
        questions: &[String],
        answers: &[String],
    ) -> (String, String) {
        let system_message = "You are an AI safety expert evaluating a safety quiz. You reply with JSON only.".to_string();

        let mut qa = String::new();
        for (idx, question) in questions.iter().enumerate() {
            let answer = answers.get(idx).map(String::as_str).unwrap_or("");
            qa.push_str(&format!(
                "Question {}: {}\nAnswer: {}\n\n",
                idx, question, answer
            ));
        }

        let user_message = format!(
            r#"Evaluate the user's answers and give a final score as a percentage from 0 to 100.
Provide specific, constructive feedback for each individual answer explaining why it is correct or incorrect.
If an answer is an empty string, the feedback for that question must be 'No answer was provided.'
Take the user's job role and job description into account.

Job Role: {}
Job Description: {}

Quiz Questions and User Answers:
{}
Reply with a single JSON object of the form {{"score": <number>, "feedback": ["...", ...]}}.
The feedback array must contain exactly {} entries, in question order."#,
            profile.job_role,
            profile.job_description,
            qa,
            questions.len()
        );

        (user_message, system_message)
    }

    /// 解析评测响应
    ///
    /// 分数限制在 0-100，反馈条数必须与题目数一致。
    fn parse_evaluation_response(
        &self,
        response: &str,
        question_count: usize,
    ) -> Result<EvaluationResult> {
        let mut result: EvaluationResult = parse_json_object(response, "评测结果")?;

        if !result.score.is_finite() {
            return Err(parse_failed("评测结果", response, None).into());
        }
        result.score = result.score.clamp(0.0, 100.0);

        if result.feedback.len() != question_count {
            return Err(AppError::Llm(LlmError::FeedbackCountMismatch {
                feedback: result.feedback.len(),
                questions: question_count,
            })
            .into());
        }

        Ok(result)
    }

    /// 生成面向主管的合规报告
    ///
    /// `strengths` / `weaknesses` 可以只是提示语，由模型根据分数自行推断。
    pub async fn generate_compliance_report(
        &self,
        profile: &ProfileData,
        score: f64,
        strengths: &str,
        weaknesses: &str,
    ) -> Result<ComplianceReport> {
        let (user_message, system_message) =
            self.build_report_messages(profile, score, strengths, weaknesses);

        let response = self
            .send_to_llm(&user_message, Some(&system_message), 2048)
            .await?;

        let report = self.parse_report_response(&response)?;
        debug!("合规报告生成完成: {} 字符", report.report.chars().count());
        Ok(report)
    }

    /// 根据岗位和测验结果推荐安全课程
    pub async fn recommend_courses(
        &self,
        job_role: &str,
        result: &QuizResult,
    ) -> Result<Vec<Course>> {
        let (user_message, system_message) = self.build_course_messages(job_role, result);

        let response = self
            .send_to_llm(&user_message, Some(&system_message), 1024)
            .await?;

        let courses = self.parse_course_response(&response)?;
        debug!("推荐课程 {} 门", courses.len());
        Ok(courses)
    }

    /// 构建合规报告的消息
    ///
    /// 返回 (user_message, system_message)
    fn build_report_messages(
        &self,
        profile: &ProfileData,
        score: f64,
        strengths: &str,
        weaknesses: &str,
    ) -> (String, String) {
        let system_message = "You are an AI assistant that generates compliance reports for supervisors. You reply with JSON only.".to_string();

        let user_message = format!(
            r#"Based on the worker's information and quiz results, create a detailed report summarizing their performance, training progress, risk awareness, and areas needing reinforcement.
Also provide specific recommendations for improving safety and compliance.

Company Type: {}
Job Role: {}
Job Description: {}
Quiz Score: {}
Strengths: {}
Weaknesses: {}

Reply with a single JSON object of the form {{"report": "...", "recommendations": "..."}}."#,
            profile.company_type,
            profile.job_role,
            profile.job_description,
            score,
            strengths,
            weaknesses
        );

        (user_message, system_message)
    }

    /// 构建课程推荐的消息
    ///
    /// 返回 (user_message, system_message)
    fn build_course_messages(&self, job_role: &str, result: &QuizResult) -> (String, String) {
        let system_message = "You are an AI safety training assistant. You reply with JSON only.".to_string();

        let user_message = format!(
            r#"Based on the job role and quiz results, recommend relevant safety courses.
For each course, provide a name and a relevant URL (e.g., from a documentation site, reputable training provider, or YouTube).

Job Role: {}
Quiz Results: {}

Reply with a single JSON object of the form {{"courses": [{{"name": "...", "url": "https://..."}}]}}."#,
            job_role,
            result.summary()
        );

        (user_message, system_message)
    }

    /// 解析合规报告响应，报告正文不能为空
    fn parse_report_response(&self, response: &str) -> Result<ComplianceReport> {
        let report: ComplianceReport = parse_json_object(response, "合规报告")?;
        if report.report.trim().is_empty() {
            return Err(parse_failed("合规报告", response, None).into());
        }
        Ok(report)
    }

    /// 解析课程推荐响应，丢弃缺少名称或链接不是 http(s) 的条目
    fn parse_course_response(&self, response: &str) -> Result<Vec<Course>> {
        #[derive(Deserialize)]
        struct CourseList {
            courses: Vec<Course>,
        }

        let list: CourseList = parse_json_object(response, "课程推荐")?;
        let total = list.courses.len();
        let courses: Vec<Course> = list.courses.into_iter().filter(Course::is_valid).collect();
        if courses.len() < total {
            warn!("丢弃 {} 条无效的课程推荐", total - courses.len());
        }
        Ok(courses)
    }
}

fn parse_failed(what: &'static str, response: &str, source: Option<BoxError>) -> AppError {
    AppError::Llm(LlmError::ResponseParseFailed {
        what,
        response: truncate_text(response, 200),
        source,
    })
}

/// 从响应中取出第一个 `{` 到最后一个 `}` 之间的 JSON 对象并反序列化
///
/// 允许 JSON 外面包裹 markdown 代码块或说明文字。
fn parse_json_object<T: DeserializeOwned>(response: &str, what: &'static str) -> Result<T> {
    let json = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => return Err(parse_failed(what, response, None).into()),
    };

    let value = serde_json::from_str(json)
        .map_err(|e| parse_failed(what, response, Some(Box::new(e) as BoxError)))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 创建测试用的 LlmService（不会发起网络请求）
    fn create_test_service() -> LlmService {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        LlmService::new(&config)
    }

    fn profile() -> ProfileData {
        ProfileData {
            company_type: "Chemical plant".to_string(),
            job_role: "Process operator".to_string(),
            job_description: "Monitors reactors and handles solvents".to_string(),
        }
    }

    #[test]
    fn test_parse_evaluation_plain_json() {
        let service = create_test_service();
        let result = service
            .parse_evaluation_response(r#"{"score": 75, "feedback": ["Good", "No answer was provided."]}"#, 2)
            .unwrap();
        assert_eq!(result.score, 75.0);
        assert_eq!(result.feedback[1], "No answer was provided.");
    }

    #[test]
    fn test_parse_evaluation_with_code_fence() {
        let service = create_test_service();
        let response = "Here is the evaluation:\n```json\n{\"score\": 140, \"feedback\": [\"Correct\"]}\n```";
        let result = service.parse_evaluation_response(response, 1).unwrap();
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_parse_evaluation_errors() {
        let service = create_test_service();

        let err = service.parse_evaluation_response("no json here", 1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Llm(LlmError::ResponseParseFailed { what: "评测结果", .. }))
        ));

        let err = service
            .parse_evaluation_response(r#"{"score": 50, "feedback": ["only one"]}"#, 3)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Llm(LlmError::FeedbackCountMismatch {
                feedback: 1,
                questions: 3
            }))
        ));
    }

    #[test]
    fn test_parse_report_response() {
        let service = create_test_service();
        let response = "```json\n{\"report\": \"Solid hazard awareness.\", \"recommendations\": \"Refresh solvent handling.\"}\n```";
        let report = service.parse_report_response(response).unwrap();
        assert_eq!(report.report, "Solid hazard awareness.");
        assert_eq!(report.recommendations, "Refresh solvent handling.");

        let err = service
            .parse_report_response(r#"{"report": "  ", "recommendations": "x"}"#)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Llm(LlmError::ResponseParseFailed { what: "合规报告", .. }))
        ));

        assert!(service.parse_report_response(r#"{"report": "missing field"}"#).is_err());
    }

    #[test]
    fn test_parse_course_response() {
        let service = create_test_service();
        let response = r#"Here are some courses:
{"courses": [
  {"name": "Chemical Handling Basics", "url": "https://www.osha.gov/chemical-hazards"},
  {"name": "Broken link", "url": "not a url"},
  {"name": "", "url": "https://example.com"}
]}"#;
        let courses = service.parse_course_response(response).unwrap();
        assert_eq!(
            courses,
            vec![Course {
                name: "Chemical Handling Basics".to_string(),
                url: "https://www.osha.gov/chemical-hazards".to_string(),
            }]
        );

        assert!(service.parse_course_response(r#"{"courses": []}"#).unwrap().is_empty());
        assert!(service.parse_course_response("no courses today").is_err());
    }

    #[test]
    fn test_report_and_course_prompts() {
        let service = create_test_service();
        let (user, _) =
            service.build_report_messages(&profile(), 80.0, "Identified from feedback", "Identified from feedback");
        assert!(user.contains("Quiz Score: 80"));
        assert!(user.contains("Company Type: Chemical plant"));

        let result = QuizResult {
            score: 60.0,
            feedback: vec!["Wrong glove type.".to_string()],
            user_answers: vec!["Cotton".to_string()],
            questions: vec!["Which gloves suit solvents?".to_string()],
        };
        let (user, _) = service.build_course_messages("Process operator", &result);
        assert!(user.contains("Job Role: Process operator"));
        assert!(user.contains("Quiz Results: Score: 60. Feedback: Wrong glove type."));
    }

    #[test]
    fn test_quiz_prompt_contains_profile() {
        let service = create_test_service();
        let (user, _system) = service.build_quiz_messages(&profile());
        assert!(user.contains("Chemical plant"));
        assert!(user.contains("Process operator"));
        assert!(user.contains("\"A)\""));
    }

    #[test]
    fn test_evaluation_prompt_pads_missing_answers() {
        let service = create_test_service();
        let questions = vec!["What is PPE?".to_string(), "Describe the route.".to_string()];
        let answers = vec!["Helmet".to_string()];
        let (user, _) = service.build_evaluation_messages(&profile(), &questions, &answers);
        assert!(user.contains("Question 0: What is PPE?\nAnswer: Helmet"));
        assert!(user.contains("Question 1: Describe the route.\nAnswer: \n"));
        assert!(user.contains("exactly 2 entries"));
    }

    /// 测试真实的测验生成
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_generate_quiz_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_quiz_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let raw = service.generate_quiz(&profile()).await.unwrap();

        println!("\n========== LLM 响应 ==========");
        println!("{}", raw);
        println!("==============================\n");

        let quiz = crate::parser::parse_quiz(&raw);
        assert!(!quiz.is_empty());
    }
}
