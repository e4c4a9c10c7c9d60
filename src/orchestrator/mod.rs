//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责题号区间的遍历和资源调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `runner` - 批量解题运行器
//! - 管理应用生命周期（初始化、运行）
//! - 持有 LeetCode 客户端和判题记录
//! - 逐题委托 `ProblemFlow`，控制题目之间的等待
//! - 输出全局统计信息
//!
//! ### `status` - 进度汇总
//! - 读取判题记录，统计已通过数量和各状态分布
//!
//! ## 层次关系
//!
//! ```text
//! runner (处理 start_id..=end_id)
//!     ↓
//! workflow::ProblemFlow (处理单道题)
//!     ↓
//! services (能力层：leetcode / llm / store / saver)
//!     ↓
//! infrastructure (基础设施：LeetCodeHttp)
//! ```

pub mod runner;
pub mod status;

// 重新导出主要类型
pub use runner::{App, RunStats};
pub use status::StatusSummary;
