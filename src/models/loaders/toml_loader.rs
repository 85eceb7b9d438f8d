use crate::error::{AppError, FileError};
use crate::models::profile::ProfileData;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载用户画像
///
/// 文件格式：
/// ```toml
/// company_type = "Construction"
/// job_role = "Site supervisor"
/// job_description = "Oversees scaffolding and crane operations"
/// ```
pub async fn load_profile(toml_file_path: &Path) -> Result<ProfileData> {
    if !toml_file_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: toml_file_path.display().to_string(),
        })
        .into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取画像文件: {}", toml_file_path.display()))?;

    let profile = parse_profile(&content)
        .with_context(|| format!("无法解析画像文件: {}", toml_file_path.display()))?;

    tracing::info!("成功加载用户画像: {}", profile);

    Ok(profile)
}

/// 解析画像 TOML 文本，并检查字段非空
pub fn parse_profile(content: &str) -> Result<ProfileData> {
    let profile: ProfileData = toml::from_str(content).map_err(AppError::from)?;

    if let Some(field) = profile.first_blank_field() {
        anyhow::bail!("画像字段 {} 不能为空", field);
    }

    Ok(profile)
}
