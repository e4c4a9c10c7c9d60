use serde::{Deserialize, Serialize};

/// 提交使用的语言 slug
pub const PYTHON3: &str = "python3";

/// LLM 生成的一份候选解答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub problem_id: u32,
    pub code: String,
    pub language: String,
    pub model_used: String,
    /// 第几次尝试（从 1 开始）
    pub attempt: u32,
    /// 模型给出的思路说明，可能为空
    #[serde(default)]
    pub reasoning: String,
}

impl Solution {
    pub fn new(
        problem_id: u32,
        code: impl Into<String>,
        model_used: impl Into<String>,
        attempt: u32,
    ) -> Self {
        Self {
            problem_id,
            code: code.into(),
            language: PYTHON3.to_string(),
            model_used: model_used.into(),
            attempt,
            reasoning: String::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}
