//! OpenAI 兼容接口的解答生成器
//!
//! 使用 `async-openai`，支持自定义 API 端点（OpenAI、Azure、各类代理等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{Problem, Solution, SubmissionResult};
use crate::services::llm::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::services::llm::{solution_from_reply, SolutionGenerator};

/// OpenAI 兼容生成器
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiGenerator {
    /// 创建新的生成器
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.ai_api_key)
            .with_api_base(&config.ai_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.ai_model.clone(),
        }
    }

    /// 发送一轮 system + user 对话，返回回复文本
    async fn complete(&self, problem_id: u32, user_message: &str) -> AppResult<String> {
        let failed = |e| AppError::llm_api_failed(&self.model_name, problem_id, e);

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(failed)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_message)
                    .build()
                    .map_err(failed)?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.2)
            .build()
            .map_err(failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("[题目 #{}] LLM API 调用失败: {}", problem_id, e);
            failed(e)
        })?;

        debug!("[题目 #{}] LLM API 调用成功", problem_id);

        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: self.model_name.clone(),
            problem_id,
        })?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}

#[async_trait]
impl SolutionGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        problem: &Problem,
        previous_attempts: &[SubmissionResult],
    ) -> AppResult<Solution> {
        let user_message = build_user_prompt(problem, previous_attempts);
        debug!(
            "[题目 #{}] 调用 LLM，模型: {}，提示词长度: {} 字符",
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
