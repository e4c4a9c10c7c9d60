//! 题目处理上下文
//!
//! 封装"我正在处理本次运行中的第几道题"这一信息

use std::fmt::Display;

/// 题目处理上下文
#[derive(Debug, Clone, Copy)]
pub struct ProblemCtx {
    /// 题号（前端展示的编号）
    pub problem_id: u32,

    /// 本次运行中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本次运行的题目总数
    pub total: usize,
}

impl ProblemCtx {
    /// 创建新的题目上下文
    pub fn new(problem_id: u32, position: usize, total: usize) -> Self {
        Self {
            problem_id,
            position,
            total,
        }
    }

    /// 是否为本次运行的最后一道题
    pub fn is_last(&self) -> bool {
        self.position >= self.total
    }
}

impl Display for ProblemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 #{}]", self.problem_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_last_and_display() {
        assert!(!ProblemCtx::new(5, 1, 2).is_last());
        assert!(ProblemCtx::new(6, 2, 2).is_last());
        assert_eq!(ProblemCtx::new(6, 2, 2).to_string(), "[题目 #6]");
    }
}
