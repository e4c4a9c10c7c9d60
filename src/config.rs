//! 程序配置
//!
//! 加载顺序（后者覆盖前者）：默认值 → TOML 配置文件 → 环境变量（含 `.env`）→ 命令行参数

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名（位于工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "auto-leetcode.toml";

/// AI 提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// OpenAI 兼容的 chat completions 接口
    OpenAi,
    /// Anthropic Messages 接口
    Claude,
}

impl AiProvider {
    /// 从字符串解析（不区分大小写）
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "claude" | "anthropic" => Ok(AiProvider::Claude),
            _ => Err(ConfigError::UnknownProvider {
                value: value.to_string(),
            }),
        }
    }

    /// 提供方的默认 API 地址
    pub fn default_base_url(self) -> &'static str {
        match self {
            AiProvider::OpenAi => "https://api.openai.com/v1",
            AiProvider::Claude => "https://api.anthropic.com",
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::OpenAi => write!(f, "openai"),
            AiProvider::Claude => write!(f, "claude"),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LeetCode 配置 ---
    pub leetcode_session: String,
    pub csrf_token: String,
    pub leetcode_base_url: String,
    // --- LLM 配置 ---
    pub ai_provider: AiProvider,
    pub ai_api_key: String,
    pub ai_base_url: String,
    pub ai_model: String,
    // --- 运行参数 ---
    /// 起始题号（含）
    pub start_id: u32,
    /// 结束题号（含）
    pub end_id: u32,
    /// 每道题最多尝试次数
    pub max_retries: u32,
    /// 是否跳过已解决的题目
    pub skip_solved: bool,
    /// 两次尝试之间的等待
    pub retry_delay: Duration,
    /// 两道题之间的等待
    pub submit_delay: Duration,
    /// 被限流后的等待
    pub rate_limit_backoff: Duration,
    /// 判题结果轮询间隔
    pub poll_interval: Duration,
    /// 判题结果最多轮询次数
    pub max_poll_attempts: u32,
    /// 解答文件保存目录
    pub solutions_dir: PathBuf,
    /// 判题记录文件（JSON Lines）
    pub results_path: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leetcode_session: String::new(),
            csrf_token: String::new(),
            leetcode_base_url: "https://leetcode.com".to_string(),
            ai_provider: AiProvider::OpenAi,
            ai_api_key: String::new(),
            ai_base_url: AiProvider::OpenAi.default_base_url().to_string(),
            ai_model: "gpt-4o".to_string(),
            start_id: 1,
            end_id: 3000,
            max_retries: 3,
            skip_solved: true,
            retry_delay: Duration::from_secs(5),
            submit_delay: Duration::from_secs(10),
            rate_limit_backoff: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 30,
            solutions_dir: PathBuf::from("solutions"),
            results_path: PathBuf::from("results.jsonl"),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub leetcode_session: Option<String>,
    pub csrf_token: Option<String>,
    pub leetcode_base_url: Option<String>,
    pub ai_provider: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_base_url: Option<String>,
    pub ai_model: Option<String>,
    pub start_id: Option<u32>,
    pub end_id: Option<u32>,
    pub max_retries: Option<u32>,
    pub skip_solved: Option<bool>,
    pub retry_delay_seconds: Option<f64>,
    pub submit_delay_seconds: Option<f64>,
    pub rate_limit_backoff_seconds: Option<f64>,
    pub poll_interval_seconds: Option<f64>,
    pub max_poll_attempts: Option<u32>,
    pub solutions_dir: Option<PathBuf>,
    pub results_path: Option<PathBuf>,
    pub verbose_logging: Option<bool>,
}

impl FileConfig {
    /// 读取配置文件
    ///
    /// 显式指定的路径必须存在；未指定时尝试工作目录下的默认文件，不存在则视为空配置
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| {
            ConfigError::FileReadFailed {
                path: path.clone(),
                source,
            }
        })?;
        Self::parse(&content, &path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_id: Option<u32>,
    pub end_id: Option<u32>,
    pub max_retries: Option<u32>,
    pub skip_solved: Option<bool>,
    pub verbose_logging: Option<bool>,
}

impl Config {
    /// 加载完整配置
    ///
    /// 先读取 `.env`（若存在），再按默认值 → 配置文件 → 环境变量 → 命令行的顺序合并
    pub fn load(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let file = FileConfig::load(config_path)?;
        Self::from_sources(file, |key| std::env::var(key).ok(), overrides)
    }

    /// 从给定来源合并配置
    ///
    /// `env` 负责查询环境变量，测试中可以传入内存表
    pub fn from_sources<F>(
        file: FileConfig,
        env: F,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let ai_provider = match lookup("AI_PROVIDER").or(file.ai_provider) {
            Some(value) => AiProvider::parse(&value)?,
            None => default.ai_provider,
        };
        let ai_base_url = lookup("AI_BASE_URL")
            .or(file.ai_base_url)
            .unwrap_or_else(|| ai_provider.default_base_url().to_string());

        let config = Self {
            leetcode_session: required(
                lookup("LEETCODE_SESSION").or(file.leetcode_session),
                "LEETCODE_SESSION",
            )?,
            csrf_token: required(lookup("CSRF_TOKEN").or(file.csrf_token), "CSRF_TOKEN")?,
            leetcode_base_url: lookup("LEETCODE_BASE_URL")
                .or(file.leetcode_base_url)
                .unwrap_or(default.leetcode_base_url),
            ai_provider,
            ai_api_key: required(lookup("AI_API_KEY").or(file.ai_api_key), "AI_API_KEY")?,
            ai_base_url,
            ai_model: lookup("AI_MODEL").or(file.ai_model).unwrap_or(default.ai_model),
            start_id: overrides
                .start_id
                .or(parse_env(&lookup, "START_ID", "u32")?)
                .or(file.start_id)
                .unwrap_or(default.start_id),
            end_id: overrides
                .end_id
                .or(parse_env(&lookup, "END_ID", "u32")?)
                .or(file.end_id)
                .unwrap_or(default.end_id),
            max_retries: overrides
                .max_retries
                .or(parse_env(&lookup, "MAX_RETRIES", "u32")?)
                .or(file.max_retries)
                .unwrap_or(default.max_retries),
            skip_solved: overrides
                .skip_solved
                .or(parse_env(&lookup, "SKIP_SOLVED", "bool")?)
                .or(file.skip_solved)
                .unwrap_or(default.skip_solved),
            retry_delay: seconds(
                parse_env(&lookup, "RETRY_DELAY_SECONDS", "f64")?.or(file.retry_delay_seconds),
                "retry_delay_seconds",
            )?
            .unwrap_or(default.retry_delay),
            submit_delay: seconds(
                parse_env(&lookup, "SUBMIT_DELAY_SECONDS", "f64")?.or(file.submit_delay_seconds),
                "submit_delay_seconds",
            )?
            .unwrap_or(default.submit_delay),
            rate_limit_backoff: seconds(
                parse_env(&lookup, "RATE_LIMIT_BACKOFF_SECONDS", "f64")?
                    .or(file.rate_limit_backoff_seconds),
                "rate_limit_backoff_seconds",
            )?
            .unwrap_or(default.rate_limit_backoff),
            poll_interval: seconds(
                parse_env(&lookup, "POLL_INTERVAL_SECONDS", "f64")?.or(file.poll_interval_seconds),
                "poll_interval_seconds",
            )?
            .unwrap_or(default.poll_interval),
            max_poll_attempts: parse_env(&lookup, "MAX_POLL_ATTEMPTS", "u32")?
                .or(file.max_poll_attempts)
                .unwrap_or(default.max_poll_attempts),
            solutions_dir: lookup("SOLUTIONS_DIR")
                .map(PathBuf::from)
                .or(file.solutions_dir)
                .unwrap_or(default.solutions_dir),
            results_path: lookup("RESULTS_PATH")
                .map(PathBuf::from)
                .or(file.results_path)
                .unwrap_or(default.results_path),
            verbose_logging: overrides
                .verbose_logging
                .or(parse_env(&lookup, "VERBOSE_LOGGING", "bool")?)
                .or(file.verbose_logging)
                .unwrap_or(default.verbose_logging),
        };

        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_id > self.end_id {
            return Err(ConfigError::Invalid(format!(
                "起始题号 {} 大于结束题号 {}",
                self.start_id, self.end_id
            )));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries 至少为 1".to_string()));
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::Invalid("max_poll_attempts 至少为 1".to_string()));
        }
        Ok(())
    }
}

fn required(value: Option<String>, var_name: &str) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::EnvVarNotFound {
        var_name: var_name.to_string(),
    })
}

fn parse_env<T, F>(
    lookup: &F,
    key: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: key.to_string(),
                value: raw,
                expected_type,
            }),
        None => Ok(None),
    }
}

fn seconds(value: Option<f64>, name: &str) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                ConfigError::Invalid(format!("{} 必须是非负秒数，实际为 {}", name, secs))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("LEETCODE_SESSION", "sess"),
            ("CSRF_TOKEN", "csrf"),
            ("AI_API_KEY", "key"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(
            FileConfig::default(),
            env_of(&base_env()),
            &ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.start_id, 1);
        assert_eq!(config.end_id, 3000);
        assert_eq!(config.max_retries, 3);
        assert!(config.skip_solved);
        assert_eq!(config.ai_provider, AiProvider::OpenAi);
        assert_eq!(config.ai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.ai_model, "gpt-4o");
        assert_eq!(config.solutions_dir, PathBuf::from("solutions"));
        assert_eq!(config.results_path, PathBuf::from("results.jsonl"));
        assert_eq!(config.rate_limit_backoff, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_required_env() {
        let err = Config::from_sources(
            FileConfig::default(),
            env_of(&[]),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvVarNotFound { ref var_name } if var_name == "LEETCODE_SESSION"
        ));
    }

    #[test]
    fn test_loads_from_env() {
        let mut env = base_env();
        env.push(("AI_PROVIDER", "claude"));
        env.push(("AI_MODEL", "claude-sonnet-4-20250514"));
        env.push(("RETRY_DELAY_SECONDS", "0.5"));

        let config = Config::from_sources(
            FileConfig::default(),
            env_of(&env),
            &ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.leetcode_session, "sess");
        assert_eq!(config.ai_provider, AiProvider::Claude);
        assert_eq!(config.ai_base_url, "https://api.anthropic.com");
        assert_eq!(config.ai_model, "claude-sonnet-4-20250514");
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_layering_order() {
        let file = FileConfig::parse(
            r#"
            start_id = 10
            end_id = 20
            max_retries = 5
            ai_model = "from-file"
            "#,
            Path::new("test.toml"),
        )
        .unwrap();

        let mut env = base_env();
        env.push(("END_ID", "30"));
        env.push(("AI_MODEL", "from-env"));

        let overrides = ConfigOverrides {
            start_id: Some(15),
            ..Default::default()
        };

        let config = Config::from_sources(file, env_of(&env), &overrides).unwrap();
        assert_eq!(config.start_id, 15);
        assert_eq!(config.end_id, 30);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.ai_model, "from-env");
    }

    #[test]
    fn test_invalid_values() {
        let mut env = base_env();
        env.push(("MAX_RETRIES", "many"));
        let err =
            Config::from_sources(FileConfig::default(), env_of(&env), &ConfigOverrides::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { .. }));

        let mut env = base_env();
        env.push(("AI_PROVIDER", "gemini"));
        let err =
            Config::from_sources(FileConfig::default(), env_of(&env), &ConfigOverrides::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider { .. }));

        let overrides = ConfigOverrides {
            start_id: Some(100),
            end_id: Some(1),
            ..Default::default()
        };
        let err = Config::from_sources(FileConfig::default(), env_of(&base_env()), &overrides)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let err = FileConfig::parse("bogus = 1", Path::new("test.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }
}
