//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`；`verbose` 时默认 `debug`
pub fn init(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - LeetCode 自动解题");
    info!("📋 题号范围: {} - {}", config.start_id, config.end_id);
    info!("🤖 模型: {} ({})", config.ai_model, config.ai_provider);
    info!("🔁 每题最多尝试: {} 次", config.max_retries);
    info!(
        "⏭️ 跳过已解决: {}",
        if config.skip_solved { "是" } else { "否" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录单题开始信息
///
/// # 参数
/// - `problem_id`: 题号
/// - `position`: 本次运行中的序号
/// - `total`: 本次运行的题目总数
pub fn log_problem_start(problem_id: u32, position: usize, total: usize) {
    info!("\n[题目 #{}] {}", problem_id, "─".repeat(30));
    info!("[题目 #{}] 处理第 {}/{} 道题目", problem_id, position, total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `accepted`: 通过数量
/// - `failed`: 失败数量
/// - `skipped`: 跳过数量
/// - `results_path`: 判题记录文件路径
pub fn print_final_stats(accepted: usize, failed: usize, skipped: usize, results_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}", accepted);
    info!("❌ 失败: {}", failed);
    info!("⏭️ 跳过: {}", skipped);
    info!("{}", "=".repeat(60));
    info!("\n判题记录已保存至: {}", results_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
