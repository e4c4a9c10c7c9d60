//! LLM 解题服务 - 业务能力层
//!
//! 只负责"根据题目（及此前失败记录）生成解答"能力，不关心提交与重试
//!
//! ## 支持的提供方
//! - `openai`: 使用 `async-openai`，兼容任何 OpenAI 风格的 chat completions 服务
//! - `claude`: 直接调用 Anthropic Messages 接口

pub mod claude_generator;
pub mod openai_generator;
pub mod prompt;

use async_trait::async_trait;

use crate::config::{AiProvider, Config};
use crate::error::{AppResult, LlmError};
use crate::models::{Problem, Solution, SubmissionResult};

pub use claude_generator::ClaudeGenerator;
pub use openai_generator::OpenAiGenerator;

/// 解答生成能力
#[async_trait]
pub trait SolutionGenerator: Send + Sync {
    /// 生成一份解答
    ///
    /// # 参数
    /// - `problem`: 题目
    /// - `previous_attempts`: 此前失败的判题结果（按时间顺序）
    async fn generate(
        &self,
        problem: &Problem,
        previous_attempts: &[SubmissionResult],
    ) -> AppResult<Solution>;

    /// 使用的模型名称
    fn model(&self) -> &str;
}

/// 根据配置创建生成器
pub fn create_generator(config: &Config) -> AppResult<Box<dyn SolutionGenerator>> {
    let generator: Box<dyn SolutionGenerator> = match config.ai_provider {
        AiProvider::OpenAi => Box::new(OpenAiGenerator::new(config)),
        AiProvider::Claude => Box::new(ClaudeGenerator::new(config)?),
    };
    Ok(generator)
}

/// 把模型回复解析成解答
///
/// 提取不到代码时返回 [`LlmError::EmptyCode`]
pub(crate) fn solution_from_reply(
    problem: &Problem,
    previous_attempts: &[SubmissionResult],
    model: &str,
    reply: &str,
) -> AppResult<Solution> {
    let code = prompt::extract_code(reply);
    if code.trim().is_empty() {
        return Err(LlmError::EmptyCode {
            problem_id: problem.id,
        }
        .into());
    }

    let attempt = previous_attempts.len() as u32 + 1;
    Ok(Solution::new(problem.id, code, model, attempt)
        .with_reasoning(prompt::extract_reasoning(reply)))
}
