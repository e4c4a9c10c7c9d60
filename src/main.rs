use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use auto_leetcode::orchestrator::{App, RunStats, StatusSummary};
use auto_leetcode::services::ResultStore;
use auto_leetcode::utils::logging;
use auto_leetcode::{Config, ConfigOverrides};

/// LeetCode 自动解题：LLM 生成 → 提交 → 根据判题结果重试
#[derive(Debug, Parser)]
#[command(name = "auto-leetcode")]
#[command(
    about = "Solve LeetCode problems with an LLM and submit them automatically",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a range of problems.
    Solve {
        /// First problem id (inclusive).
        #[arg(long, value_name = "N")]
        start: Option<u32>,
        /// Last problem id (inclusive).
        #[arg(long, value_name = "N")]
        end: Option<u32>,
        /// Attempts per problem.
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
        /// Skip problems already accepted locally or on LeetCode.
        #[arg(long, overrides_with = "no_skip_solved")]
        skip_solved: bool,
        /// Attempt problems even when already accepted.
        #[arg(long)]
        no_skip_solved: bool,
        /// Path to a TOML config file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Debug-level logging.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Show solved count and a per-status breakdown of stored results.
    Status {
        /// Path to a TOML config file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Solve {
            start,
            end,
            retries,
            skip_solved,
            no_skip_solved,
            config,
            verbose,
        } => {
            let overrides = ConfigOverrides {
                start_id: start,
                end_id: end,
                max_retries: retries,
                skip_solved: skip_flag(skip_solved, no_skip_solved),
                verbose_logging: verbose.then_some(true),
            };
            let Some(config) = load_config(config, &overrides) else {
                return ExitCode::FAILURE;
            };
            logging::init(config.verbose_logging);

            tokio::select! {
                result = solve(config) => match result {
                    Ok(_) => ExitCode::SUCCESS,
                    Err(e) => {
                        error!("❌ 运行中止: {:#}", e);
                        eprintln!("Error: {:#}", e);
                        ExitCode::FAILURE
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    warn!("⏹️ 收到中断信号，停止运行");
                    eprintln!("Interrupted.");
                    ExitCode::SUCCESS
                }
            }
        }
        Command::Status { config } => {
            let Some(config) = load_config(config, &ConfigOverrides::default()) else {
                return ExitCode::FAILURE;
            };
            logging::init(config.verbose_logging);

            match status(&config) {
                Ok(summary) => {
                    print!("{}", summary);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn skip_flag(skip_solved: bool, no_skip_solved: bool) -> Option<bool> {
    if no_skip_solved {
        Some(false)
    } else if skip_solved {
        Some(true)
    } else {
        None
    }
}

fn load_config(path: Option<PathBuf>, overrides: &ConfigOverrides) -> Option<Config> {
    match Config::load(path.as_deref(), overrides) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

async fn solve(config: Config) -> Result<RunStats> {
    let mut app = App::initialize(config).context("初始化失败")?;
    let stats = app.run().await.context("运行失败")?;
    Ok(stats)
}

fn status(config: &Config) -> Result<StatusSummary> {
    let store = ResultStore::open(&config.results_path)
        .with_context(|| format!("无法读取判题记录 {}", config.results_path.display()))?;
    Ok(StatusSummary::from_store(&store)?)
}
