use crate::config::Config;
use crate::error::{AppError, QuizError};
use crate::models::{load_profile, ProfileData, QuizQuestion, QuizResult};
use crate::services::LlmService;
use crate::utils::logging::{log_startup, print_final_result, print_safety_report};
use crate::workflow::{QuizFlow, QuizSession};
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    profile: ProfileData,
    flow: QuizFlow<LlmService>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().map_err(AppError::from)?;

        log_startup(&config.llm_model_name, config.max_generation_attempts);

        let profile = load_profile(Path::new(&config.profile_file)).await?;
        let flow = QuizFlow::new(LlmService::new(&config), &config);

        Ok(Self {
            config,
            profile,
            flow,
        })
    }

    /// 运行应用主逻辑：生成 → 答题 → 评测 → 报告
    pub async fn run(&self) -> Result<QuizResult> {
        let mut session = self.flow.prepare(&self.profile).await?;

        let mut lines = BufReader::new(stdin()).lines();
        self.take_quiz(&mut session, &mut lines).await?;

        let result = self
            .flow
            .evaluate(&self.profile, &session, self.config.require_all_answers)
            .await?;

        print_final_result(&result);
        println!("{}", serde_json::to_string_pretty(&result)?);

        // 报告失败不影响已经得到的评分
        match self.flow.report(&self.profile, &result).await {
            Ok(report) => {
                print_safety_report(&report);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(e) => warn!("⚠️ 合规报告生成失败: {}", e),
        }

        Ok(result)
    }

    /// 逐题作答，直到可以提交
    async fn take_quiz(
        &self,
        session: &mut QuizSession,
        lines: &mut Lines<BufReader<Stdin>>,
    ) -> Result<()> {
        loop {
            print_question(&mut std::io::stdout(), session)?;

            let Some(input) = lines.next_line().await? else {
                warn!("输入已结束，未作答的题目按空答案提交");
                return Ok(());
            };

            let answer = resolve_choice(session.current(), &input);
            if let Err(e) = session.set_answer(answer) {
                println!("⚠️ {}", e);
                continue;
            }

            if session.next() {
                continue;
            }

            // 最后一题已作答，检查是否有遗漏
            match session.first_unanswered() {
                Some(index) if self.config.require_all_answers => {
                    println!("⚠️ {}", QuizError::Incomplete { index });
                    session.go_to(index)?;
                }
                _ => {
                    info!("✓ 全部题目作答完成");
                    return Ok(());
                }
            }
        }
    }
}

fn print_question(out: &mut impl Write, session: &QuizSession) -> std::io::Result<()> {
    let question = session.current();
    writeln!(
        out,
        "\n第 {}/{} 题 ({:.0}%)",
        session.current_index() + 1,
        session.len(),
        session.progress()
    )?;
    writeln!(out, "{}", question.question())?;
    match question.options() {
        Some(options) => {
            for (i, option) in options.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, option)?;
            }
            write!(out, "请输入选项编号: ")?;
        }
        None => write!(out, "请输入你的回答: ")?,
    }
    out.flush()
}

/// 把用户输入转换为答案
///
/// 选择题支持输入编号（1 开始）或字母 A-D；其他输入原样返回，由会话校验。
pub fn resolve_choice(question: &QuizQuestion, input: &str) -> String {
    let input = input.trim();
    let Some(options) = question.options() else {
        return input.to_string();
    };

    let index = match input.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => match input.as_bytes() {
            [c @ (b'a'..=b'd' | b'A'..=b'D')] => Some((c.to_ascii_uppercase() - b'A') as usize),
            _ => None,
        },
    };

    index
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_quiz;

    #[test]
    fn test_resolve_choice() {
        let quiz = parse_quiz("1. What is PPE?\nA) Shoes\nB) Helmet\nC) Gloves\n2. Describe your evacuation route.");
        let mc = &quiz.questions()[0];

        assert_eq!(resolve_choice(mc, "2"), "Helmet");
        assert_eq!(resolve_choice(mc, " c "), "Gloves");
        assert_eq!(resolve_choice(mc, "Shoes"), "Shoes");
        // 超出范围的编号原样返回，交给会话校验
        assert_eq!(resolve_choice(mc, "9"), "9");
        assert_eq!(resolve_choice(mc, "0"), "0");

        let text = &quiz.questions()[1];
        assert_eq!(resolve_choice(text, " 2 "), "2");
    }

    #[test]
    fn test_print_question() {
        let quiz = parse_quiz("1. What is PPE?\nA) Shoes\nB) Helmet\n2. Describe your evacuation route.");
        let session = QuizSession::new(quiz).unwrap();

        let mut out = Vec::new();
        print_question(&mut out, &session).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("第 1/2 题"));
        assert!(text.contains("  2. Helmet\n"));
        assert!(text.ends_with("请输入选项编号: "));
    }

    #[test]
    fn test_print_question_reports_write_errors() {
        struct BrokenPipe;

        impl Write for BrokenPipe {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let session = QuizSession::new(parse_quiz("Describe your evacuation route.")).unwrap();
        let err = print_question(&mut BrokenPipe, &session).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
