//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 已解决 → 跳过
//! 2. 拉取题目（限流 → 等待后跳过）
//! 3. 付费题 / 无 python3 起始代码 → 跳过
//! 4. 生成 → 写文件 → 提交（限流时重提）→ 记录，未通过则带着失败记录再来

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{Problem, Solution, SubmissionResult};
use crate::services::{JudgeClient, ResultStore, SolutionGenerator, SolutionSaver};
use crate::utils::truncate_text;
use crate::workflow::problem_ctx::ProblemCtx;

/// 单次解答最多提交次数（含限流后的重提）
const SUBMIT_MAX_TRIES: u32 = 3;

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 本地或远端已通过
    AlreadySolved,
    /// 题号不存在
    NotFound,
    /// 付费题
    PaidOnly,
    /// 没有 python3 起始代码
    NoStarterCode,
    /// 拉取题目时被限流
    RateLimited,
    /// 拉取题目失败
    FetchFailed,
}

/// 题目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 通过
    Accepted { attempts: u32 },
    /// 尝试用尽或中途失败
    Failed { attempts: u32 },
    /// 未进入尝试循环
    Skipped(SkipReason),
}

impl ProcessResult {
    /// 是否进入过尝试循环（决定题目之间是否需要等待）
    pub fn attempted(&self) -> bool {
        !matches!(self, ProcessResult::Skipped(_))
    }
}

/// 重试与等待策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub rate_limit_backoff: Duration,
    pub skip_solved: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            rate_limit_backoff: config.rate_limit_backoff,
            skip_solved: config.skip_solved,
        }
    }
}

/// 题目处理流程
///
/// - 编排完整的单题流程
/// - 决定何时跳过、何时重试、何时放弃
/// - 不持有判题客户端和记录文件，由编排层传入
pub struct ProblemFlow {
    generator: Box<dyn SolutionGenerator>,
    saver: SolutionSaver,
    policy: RetryPolicy,
}

impl ProblemFlow {
    /// 创建新的题目处理流程
    pub fn new(config: &Config, generator: Box<dyn SolutionGenerator>) -> Self {
        Self::with_parts(
            generator,
            SolutionSaver::new(&config.solutions_dir),
            RetryPolicy::from_config(config),
        )
    }

    pub fn with_parts(
        generator: Box<dyn SolutionGenerator>,
        saver: SolutionSaver,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            saver,
            policy,
        }
    }

    /// 处理一道题
    ///
    /// 只有致命错误（会话过期、存储失败）会以 `Err` 返回，其余情况都归入 [`ProcessResult`]
    pub async fn run(
        &self,
        judge: &dyn JudgeClient,
        store: &mut ResultStore,
        remote_solved: &HashSet<u32>,
        ctx: &ProblemCtx,
    ) -> AppResult<ProcessResult> {
        if self.policy.skip_solved
            && (store.is_solved(ctx.problem_id) || remote_solved.contains(&ctx.problem_id))
        {
            info!("{} ⏭️ 已解决，跳过", ctx);
            return Ok(ProcessResult::Skipped(SkipReason::AlreadySolved));
        }

        let problem = match judge.fetch_problem(ctx.problem_id).await {
            Ok(Some(problem)) => problem,
            Ok(None) => {
                info!("{} ⏭️ 题目不存在，跳过", ctx);
                return Ok(ProcessResult::Skipped(SkipReason::NotFound));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) if e.is_rate_limited() => {
                warn!(
                    "{} ⚠️ 拉取题目被限流，等待 {:?} 后继续下一题",
                    ctx, self.policy.rate_limit_backoff
                );
                sleep(self.policy.rate_limit_backoff).await;
                return Ok(ProcessResult::Skipped(SkipReason::RateLimited));
            }
            Err(e) => {
                error!("{} ❌ 拉取题目失败: {}", ctx, e);
                return Ok(ProcessResult::Skipped(SkipReason::FetchFailed));
            }
        };

        if !problem.is_solvable() {
            let reason = if problem.paid_only {
                info!("{} ⏭️ 付费题目，跳过", ctx);
                SkipReason::PaidOnly
            } else {
                info!("{} ⏭️ 没有 python3 起始代码，跳过", ctx);
                SkipReason::NoStarterCode
            };
            return Ok(ProcessResult::Skipped(reason));
        }

        info!("{} {} ({})", ctx, problem.title, problem.difficulty);
        self.attempt_loop(judge, store, &problem, ctx).await
    }

    /// 生成 → 提交 → 记录，直到通过或尝试次数用尽
    async fn attempt_loop(
        &self,
        judge: &dyn JudgeClient,
        store: &mut ResultStore,
        problem: &Problem,
        ctx: &ProblemCtx,
    ) -> AppResult<ProcessResult> {
        let mut previous_attempts: Vec<SubmissionResult> = Vec::new();

        for attempt in 1..=self.policy.max_retries {
            info!(
                "{} 🤖 第 {}/{} 次尝试，正在生成解答...",
                ctx, attempt, self.policy.max_retries
            );

            let solution = match self.generator.generate(problem, &previous_attempts).await {
                Ok(solution) => solution,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("{} ❌ 生成解答失败: {}", ctx, e);
                    return Ok(ProcessResult::Failed { attempts: attempt });
                }
            };
            debug!("{} 代码预览: {}", ctx, truncate_text(&solution.code, 120));

            self.saver.save(&solution)?;

            let Some(result) = self.submit_with_retry(judge, &solution, ctx).await? else {
                return Ok(ProcessResult::Failed { attempts: attempt });
            };

            store.save(&result)?;

            if result.is_accepted() {
                info!(
                    "{} ✅ 通过！第 {} 次尝试 (运行时间: {}, 内存: {})",
                    ctx,
                    attempt,
                    result
                        .runtime_ms
                        .map(|ms| format!("{} ms", ms))
                        .unwrap_or_else(|| "-".to_string()),
                    result
                        .memory_mb
                        .map(|mb| format!("{} MB", mb))
                        .unwrap_or_else(|| "-".to_string()),
                );
                return Ok(ProcessResult::Accepted { attempts: attempt });
            }

            warn!("{} ⚠️ 第 {} 次尝试未通过: {}", ctx, attempt, result.status);
            if let Some(msg) = &result.error_message {
                debug!("{} 失败详情: {}", ctx, truncate_text(msg, 200));
            }
            previous_attempts.push(result);

            if attempt < self.policy.max_retries {
                sleep(self.policy.retry_delay).await;
            }
        }

        error!(
            "{} ❌ {} 次尝试均未通过，放弃",
            ctx, self.policy.max_retries
        );
        Ok(ProcessResult::Failed {
            attempts: self.policy.max_retries,
        })
    }

    /// 提交解答，被限流时等待后重提
    ///
    /// 返回 `None` 表示本次解答没有拿到判题结果
    async fn submit_with_retry(
        &self,
        judge: &dyn JudgeClient,
        solution: &Solution,
        ctx: &ProblemCtx,
    ) -> AppResult<Option<SubmissionResult>> {
        for try_no in 1..=SUBMIT_MAX_TRIES {
            match judge.submit(solution).await {
                Ok(result) => return Ok(Some(result)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_rate_limited() => {
                    // 最后一次被限流后同样等待
                    warn!(
                        "{} ⚠️ 提交被限流 ({}/{})，等待 {:?}",
                        ctx, try_no, SUBMIT_MAX_TRIES, self.policy.rate_limit_backoff
                    );
                    sleep(self.policy.rate_limit_backoff).await;
                }
                Err(e) => {
                    error!("{} ❌ 提交失败: {}", ctx, e);
                    return Ok(None);
                }
            }
        }

        error!(
            "{} ❌ 连续 {} 次提交被限流，放弃本次解答",
            ctx, SUBMIT_MAX_TRIES
        );
        Ok(None)
    }
}
