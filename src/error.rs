use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LeetCode 接口错误
    #[error("LeetCode错误: {0}")]
    LeetCode(#[from] LeetCodeError),
    /// LLM 生成错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LeetCode 接口错误
#[derive(Debug, Error)]
pub enum LeetCodeError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 会话过期或无效 (401/403)
    #[error("会话已过期或无效 ({endpoint})")]
    AuthExpired { endpoint: String },
    /// 请求频率限制 (429)
    #[error("请求频率限制 ({endpoint})")]
    RateLimited { endpoint: String },
    /// 非预期的 HTTP 状态码
    #[error("非预期的状态码 {status} ({endpoint}): {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// GraphQL 返回 errors 字段
    #[error("GraphQL 错误: {errors}")]
    GraphQl { errors: String },
    /// 响应缺少必要字段
    #[error("响应缺少字段 {field} ({endpoint}): {body}")]
    MissingField {
        endpoint: String,
        field: &'static str,
        body: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 题号映射表尚未构建
    #[error("题号映射表尚未构建，请先调用 build_slug_map()")]
    SlugMapNotBuilt,
    /// 题号不在映射表中
    #[error("题目 #{problem_id} 没有对应的 slug")]
    UnknownProblem { problem_id: u32 },
    /// 轮询次数耗尽仍未出结果
    #[error("提交 {submission_id} 轮询 {attempts} 次后仍未完成")]
    PollExhausted { submission_id: u64, attempts: u32 },
}

/// LLM 生成错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}, 题目 #{problem_id}): {source}")]
    ApiCallFailed {
        model: String,
        problem_id: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model}, 题目 #{problem_id})")]
    EmptyResponse { model: String, problem_id: u32 },
    /// 提取出的代码为空
    #[error("题目 #{problem_id} 生成的代码为空")]
    EmptyCode { problem_id: u32 },
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 记录行无法解析
    #[error("记录解析失败 ({}, 第 {line} 行): {source}", .path.display())]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// 记录序列化失败
    #[error("记录序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("缺少必需的环境变量: {var_name}")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 未知的 AI 提供方
    #[error("未知的 AI_PROVIDER: '{value}' (可选: openai, claude)")]
    UnknownProvider { value: String },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置值不合法: {0}")]
    Invalid(String),
}

// ========== 错误分类 ==========

impl AppError {
    /// 是否为频率限制（可等待后重试）
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::LeetCode(LeetCodeError::RateLimited { .. }))
    }

    /// 是否为会话过期（整个运行无法继续）
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, AppError::LeetCode(LeetCodeError::AuthExpired { .. }))
    }

    /// 是否需要中止整个运行
    pub fn is_fatal(&self) -> bool {
        self.is_auth_expired() || matches!(self, AppError::Storage(_) | AppError::Config(_))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::LeetCode(LeetCodeError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        problem_id: u32,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            problem_id,
            source: Box::new(source),
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let rate = AppError::from(LeetCodeError::RateLimited {
            endpoint: "/graphql".to_string(),
        });
        assert!(rate.is_rate_limited());
        assert!(!rate.is_fatal());

        let auth = AppError::from(LeetCodeError::AuthExpired {
            endpoint: "/graphql".to_string(),
        });
        assert!(auth.is_auth_expired());
        assert!(auth.is_fatal());

        let empty = AppError::from(LlmError::EmptyCode { problem_id: 1 });
        assert!(!empty.is_fatal());
    }

    #[test]
    fn test_display_names_variable() {
        let err = AppError::from(ConfigError::EnvVarNotFound {
            var_name: "LEETCODE_SESSION".to_string(),
        });
        assert!(err.to_string().contains("LEETCODE_SESSION"));
    }
}
