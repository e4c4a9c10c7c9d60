//! Anthropic Claude 解答生成器
//!
//! 直接调用 Messages 接口（`POST {base}/v1/messages`）

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, LlmError};
use crate::models::{Problem, Solution, SubmissionResult};
use crate::services::llm::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::services::llm::{solution_from_reply, SolutionGenerator};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Claude 接口返回的错误
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
struct ApiStatusError {
    status: u16,
    body: String,
}

/// Claude 生成器
pub struct ClaudeGenerator {
    client: Client,
    endpoint: String,
    model_name: String,
}

impl ClaudeGenerator {
    /// 创建新的生成器
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            client: build_client(&config.ai_api_key)?,
            endpoint: format!("{}/v1/messages", config.ai_base_url.trim_end_matches('/')),
            model_name: config.ai_model.clone(),
        })
    }

    /// 发送一轮对话，返回第一个文本块
    async fn complete(&self, problem_id: u32, user_message: &str) -> AppResult<String> {
        let failed = |e: Box<dyn std::error::Error + Send + Sync>| {
            warn!("[题目 #{}] Claude API 调用失败: {}", problem_id, e);
            AppError::Llm(LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                problem_id,
                source: e,
            })
        };

        let request = MessagesRequest {
            model: &self.model_name,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![RequestMessage {
                role: "user",
                content: user_message,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| failed(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(Box::new(ApiStatusError {
                status: status.as_u16(),
                body,
            })));
        }

        let body: MessagesResponse = response.json().await.map_err(|e| failed(Box::new(e)))?;
        debug!("[题目 #{}] Claude API 调用成功", problem_id);

        body.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                LlmError::EmptyResponse {
                    model: self.model_name.clone(),
                    problem_id,
                }
                .into()
            })
    }
}

/// 构建带鉴权头的 HTTP 客户端，失败属于配置问题
fn build_client(api_key: &str) -> Result<Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-api-key",
        HeaderValue::from_str(api_key)
            .map_err(|_| ConfigError::Invalid("AI_API_KEY 包含非法字符".to_string()))?,
    );
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("无法创建 Claude HTTP 客户端: {}", e)))
}

#[async_trait]
impl SolutionGenerator for ClaudeGenerator {
    async fn generate(
        &self,
        problem: &Problem,
        previous_attempts: &[SubmissionResult],
    ) -> AppResult<Solution> {
        let user_message = build_user_prompt(problem, previous_attempts);
        debug!(
            "[题目 #{}] 调用 Claude，模型: {}，提示词长度: {} 字符",
            problem.id,
            self.model_name,
            user_message.len()
        );

        let reply = self.complete(problem.id, &user_message).await?;
        solution_from_reply(problem, previous_attempts, &self.model_name, &reply)
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}
