//! 解析失败记录服务 - 业务能力层
//!
//! 只负责"把解析不出题目的原始文本写入文件"，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::AppError;

/// 解析失败记录服务
pub struct FailureWriter {
    log_file_path: String,
}

impl FailureWriter {
    pub fn new() -> Self {
        Self::with_path("quiz_failures.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `attempt`: 第几次生成
    /// - `raw_text`: LLM 返回的原始文本
    pub fn write(&self, attempt: usize, raw_text: &str) -> Result<()> {
        debug!(
            "写入解析失败记录: 第 {} 次生成 | 原文长度: {}",
            attempt,
            raw_text.len()
        );

        let record = format!(
            "{}\n[{}] 第 {} 次生成未解析出题目\n{}\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            attempt,
            "-".repeat(60),
            raw_text
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        file.write_all(record.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        Ok(())
    }
}

impl Default for FailureWriter {
    fn default() -> Self {
        Self::new()
    }
}
