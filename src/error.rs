use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 测验流程错误
    #[error("测验错误: {0}")]
    Quiz(#[from] QuizError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed { model: String, source: BoxError },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 结构化响应（评测、报告、课程）解析失败
    #[error("无法解析{what} (响应: {response})")]
    ResponseParseFailed {
        what: &'static str,
        response: String,
        #[source]
        source: Option<BoxError>,
    },
    /// 反馈数量与题目数量不一致
    #[error("反馈数量 {feedback} 与题目数量 {questions} 不一致")]
    FeedbackCountMismatch { feedback: usize, questions: usize },
}

/// 测验流程错误
#[derive(Debug, Error)]
pub enum QuizError {
    /// 多次生成后仍解析不出任何题目
    #[error("AI 未能生成有效测验 (已尝试 {attempts} 次)，请重试")]
    EmptyQuiz { attempts: usize },
    /// 测验中没有任何题目
    #[error("测验中没有任何题目")]
    NoQuestions,
    /// 题目索引超出范围
    #[error("题目索引 {index} 超出范围 [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// 选择题答案不在选项中
    #[error("第 {} 题的答案 '{answer}' 不是有效选项", .index + 1)]
    InvalidOption { index: usize, answer: String },
    /// 存在未作答的题目
    #[error("请先回答第 {} 题再提交", .index + 1)]
    Incomplete { index: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxError },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxError },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed { path: String, source: BoxError },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在或为空
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 配置值非法
    #[error("配置项 {name} 的值 '{value}' 无效: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

// ========== 从常见错误类型转换 ==========
// anyhow 已为所有 std::error::Error 类型实现了转换，这里只处理第三方错误 -> AppError

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Llm(LlmError::ResponseParseFailed {
            what: "JSON",
            response: String::new(),
            source: Some(Box::new(err) as BoxError),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
