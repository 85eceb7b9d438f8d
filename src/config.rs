use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 用户画像 TOML 文件
    pub profile_file: String,
    /// 解析失败的原始文本记录文件
    pub failure_log_file: String,
    /// 测验生成的最大尝试次数
    pub max_generation_attempts: usize,
    /// 提交前是否要求每道题都已作答
    pub require_all_answers: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            profile_file: "profile.toml".to_string(),
            failure_log_file: "quiz_failures.txt".to_string(),
            max_generation_attempts: 3,
            require_all_answers: true,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            profile_file: std::env::var("PROFILE_FILE").unwrap_or(default.profile_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(default.failure_log_file),
            max_generation_attempts: std::env::var("MAX_GENERATION_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_generation_attempts),
            require_all_answers: std::env::var("REQUIRE_ALL_ANSWERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.require_all_answers),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查必需的配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_GENERATION_ATTEMPTS".to_string(),
                value: "0".to_string(),
                reason: "至少需要尝试一次".to_string(),
            });
        }
        Ok(())
    }
}
