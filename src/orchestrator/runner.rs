//! 批量解题运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责题号区间的遍历和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：打印启动信息、创建 LeetCode 客户端、生成器、记录存储
//! 2. **准备阶段**：构建题号映射表，按需拉取远端已通过列表
//! 3. **顺序处理**：逐题委托 `ProblemFlow`，题目之间按配置等待
//! 4. **全局统计**：汇总通过 / 失败 / 跳过数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单道题的细节
//! - **资源所有者**：唯一持有客户端和记录文件的模块
//! - **串行执行**：判题平台对频率敏感，同一时刻只处理一道题

use std::collections::HashSet;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::services::{create_generator, LeetCodeClient, ResultStore, SolutionGenerator};
use crate::utils::logging;
use crate::workflow::{ProblemCtx, ProblemFlow, ProcessResult};

/// 运行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub accepted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunStats {
    fn record(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Accepted { .. } => self.accepted += 1,
            ProcessResult::Failed { .. } => self.failed += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    client: LeetCodeClient,
    flow: ProblemFlow,
    store: ResultStore,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let client = LeetCodeClient::new(&config)?;
        let generator = create_generator(&config)?;
        Self::from_parts(config, client, generator)
    }

    /// 使用已创建好的客户端和生成器组装应用
    pub fn from_parts(
        config: Config,
        client: LeetCodeClient,
        generator: Box<dyn SolutionGenerator>,
    ) -> AppResult<Self> {
        let store = ResultStore::open(&config.results_path)?;
        let flow = ProblemFlow::new(&config, generator);

        Ok(Self {
            config,
            client,
            flow,
            store,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 会话过期或记录文件写入失败时中止并返回错误
    pub async fn run(&mut self) -> AppResult<RunStats> {
        info!("📚 正在构建题号映射表...");
        self.client.build_slug_map().await?;

        let remote_solved = self.load_remote_solved().await?;

        let ids: Vec<u32> = (self.config.start_id..=self.config.end_id).collect();
        let total = ids.len();
        let mut stats = RunStats::default();

        for (index, problem_id) in ids.into_iter().enumerate() {
            let ctx = ProblemCtx::new(problem_id, index + 1, total);
            logging::log_problem_start(problem_id, ctx.position, ctx.total);

            let result = self
                .flow
                .run(&self.client, &mut self.store, &remote_solved, &ctx)
                .await?;
            stats.record(result);

            if pause_after(result, &ctx) {
                sleep(self.config.submit_delay).await;
            }
        }

        logging::print_final_stats(
            stats.accepted,
            stats.failed,
            stats.skipped,
            &self.config.results_path,
        );

        Ok(stats)
    }

    /// 拉取远端已通过列表（关闭跳过时不拉取）
    async fn load_remote_solved(&self) -> AppResult<HashSet<u32>> {
        if !self.config.skip_solved {
            return Ok(HashSet::new());
        }

        info!("🔎 正在拉取已通过题目...");
        match self.client.fetch_solved_ids().await {
            Ok(ids) => {
                info!("✓ 远端已通过 {} 道题目", ids.len());
                Ok(ids)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("⚠️ 拉取已通过题目失败，仅使用本地记录: {}", e);
                Ok(HashSet::new())
            }
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }
}

/// 处理完一道题后是否需要等待 `submit_delay`
///
/// 只有进入过尝试循环的题目才等待，区间最后一道题之后不等待
fn pause_after(result: ProcessResult, ctx: &ProblemCtx) -> bool {
    result.attempted() && !ctx.is_last()
}
