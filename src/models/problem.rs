use serde::{Deserialize, Serialize};

/// 题目信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// 前端题号（题目列表中展示的编号）
    pub id: u32,
    pub title: String,
    /// 题目 URL 中的标识，如 `two-sum`
    pub slug: String,
    pub difficulty: String,
    /// 去除 HTML 后的题面
    pub description: String,
    /// 目标语言的起始代码，没有时为空字符串
    pub code_snippet: String,
    /// 是否为会员题
    pub paid_only: bool,
}

impl Problem {
    /// 是否可以交给 LLM 作答
    pub fn is_solvable(&self) -> bool {
        !self.paid_only && !self.code_snippet.trim().is_empty()
    }
}
