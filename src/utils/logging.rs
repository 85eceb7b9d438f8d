/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use crate::models::{Quiz, QuizResult, SafetyReport, PASSING_SCORE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 优先读取 `RUST_LOG`，否则根据 `verbose` 使用 debug 或 info 级别。
/// 重复调用不会报错（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `model`: 使用的模型名称
/// - `max_attempts`: 最大生成次数
pub fn log_startup(model: &str, max_attempts: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - 安全测验 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", model);
    info!("🔁 最大生成次数: {}", max_attempts);
    info!("{}", "=".repeat(60));
}

/// 记录测验加载信息
pub fn log_quiz_loaded(quiz: &Quiz, attempt: usize) {
    info!(
        "✓ 第 {} 次生成成功，共 {} 道题目 (选择题 {} / 简答题 {})",
        attempt,
        quiz.len(),
        quiz.multiple_choice_count(),
        quiz.len() - quiz.multiple_choice_count()
    );
}

/// 打印最终结果
pub fn print_final_result(result: &QuizResult) {
    info!("\n{}", "=".repeat(60));
    info!("📊 测验评分完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🏅 得分: {:.0}/100", result.score);
    if result.passed() {
        info!("✅ 通过 (及格线 {:.0})", PASSING_SCORE);
    } else {
        info!("❌ 未通过 (及格线 {:.0})", PASSING_SCORE);
    }
    for (i, feedback) in result.feedback.iter().enumerate() {
        info!("  {}. {}", i + 1, truncate_text(feedback, 120));
    }
    info!("{}", "=".repeat(60));
}

/// 打印合规报告与推荐课程
pub fn print_safety_report(report: &SafetyReport) {
    info!("{}", "=".repeat(60));
    info!("📋 合规报告");
    info!("{}", report.compliance.report);
    info!("💡 改进建议");
    info!("{}", report.compliance.recommendations);
    if report.courses.is_empty() {
        info!("📚 暂无推荐课程");
    } else {
        info!("📚 推荐课程:");
        for course in &report.courses {
            info!("  - {} ({})", course.name, course.url);
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
