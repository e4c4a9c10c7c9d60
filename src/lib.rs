//! # Auto LeetCode
//!
//! 一个用 LLM 自动解答并提交 LeetCode 题目的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有带会话的 HTTP 客户端，只暴露能力
//! - `LeetCodeHttp` - GraphQL / REST 调用，统一把 401、429 等状态翻译成错误
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单道题
//! - `LeetCodeClient` - 查题、拉取已通过列表、提交并轮询判题结果
//! - `SolutionGenerator` - LLM 生成解答能力（OpenAI / Claude）
//! - `ResultStore` - 写 results.jsonl 能力
//! - `SolutionSaver` - 写 solutions/ 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `ProblemCtx` - 上下文封装（题号 + 序号）
//! - `ProblemFlow` - 流程编排（fetch → generate → submit → record → retry）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/runner` - 遍历题号区间，管理资源和统计
//! - `orchestrator/status` - 判题记录汇总
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ConfigOverrides};
pub use error::{AppError, AppResult};
pub use infrastructure::LeetCodeHttp;
pub use models::{Problem, Solution, SubmissionResult, SubmissionStatus};
pub use orchestrator::{App, RunStats, StatusSummary};
pub use workflow::{ProblemCtx, ProblemFlow, ProcessResult};
