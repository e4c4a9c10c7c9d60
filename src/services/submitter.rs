//! 提交与判题轮询
//!
//! 提交接口立即返回 submission_id，判题是异步的，需要轮询 check 接口直到出结果

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppResult, LeetCodeError};
use crate::infrastructure::LeetCodeHttp;
use crate::models::{Solution, SubmissionResult, SubmissionStatus};

/// 判题结果轮询策略
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// 每次轮询前的等待
    pub interval: Duration,
    /// 最多轮询次数
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// check 接口的响应（只取用到的字段）
#[derive(Debug, Default, Deserialize)]
struct CheckResponse {
    state: Option<String>,
    status_code: Option<i64>,
    status_runtime: Option<JsonValue>,
    status_memory: Option<JsonValue>,
    full_runtime_error: Option<String>,
    compile_error: Option<String>,
    last_testcase: Option<String>,
    expected_output: Option<String>,
    code_output: Option<JsonValue>,
}

/// 提交解答并等待判题结果
///
/// # 参数
/// - `http`: LeetCode HTTP 通道
/// - `slug`: 题目 slug
/// - `solution`: 待提交的解答
/// - `poll`: 轮询策略
pub async fn submit_solution(
    http: &LeetCodeHttp,
    slug: &str,
    solution: &Solution,
    poll: &PollPolicy,
) -> AppResult<SubmissionResult> {
    let endpoint = format!("/problems/{}/submit/", slug);
    let data: JsonValue = http
        .post_json(
            &endpoint,
            &json!({
                "lang": solution.language,
                "question_id": solution.problem_id.to_string(),
                "typed_code": solution.code,
            }),
        )
        .await?;

    let submission_id = data
        .get("submission_id")
        .and_then(submission_id_of)
        .filter(|id| *id != 0)
        .ok_or_else(|| LeetCodeError::MissingField {
            endpoint: endpoint.clone(),
            field: "submission_id",
            body: data.to_string(),
        })?;

    info!(
        "[题目 #{}] 📤 已提交 (submission {})，等待判题...",
        solution.problem_id, submission_id
    );

    poll_result(http, submission_id, solution, poll).await
}

/// 轮询判题结果
async fn poll_result(
    http: &LeetCodeHttp,
    submission_id: u64,
    solution: &Solution,
    poll: &PollPolicy,
) -> AppResult<SubmissionResult> {
    let endpoint = format!("/submissions/detail/{}/check/", submission_id);

    for attempt in 1..=poll.max_attempts {
        sleep(poll.interval).await;

        let Some(data) = http.get_json::<CheckResponse>(&endpoint).await? else {
            continue;
        };

        if data.state.as_deref() != Some("SUCCESS") {
            debug!(
                "submission {} 第 {} 次轮询: state={:?}",
                submission_id, attempt, data.state
            );
            continue;
        }

        return Ok(into_result(data, solution));
    }

    Err(LeetCodeError::PollExhausted {
        submission_id,
        attempts: poll.max_attempts,
    }
    .into())
}

fn into_result(data: CheckResponse, solution: &Solution) -> SubmissionResult {
    let status = SubmissionStatus::from_status_code(data.status_code.unwrap_or(-1));
    let error_message = build_error_message(&data, status);

    SubmissionResult {
        problem_id: solution.problem_id,
        status,
        runtime_ms: parse_runtime_ms(data.status_runtime.as_ref()),
        memory_mb: parse_memory_mb(data.status_memory.as_ref()),
        error_message,
        solution: solution.clone(),
    }
}

/// 组装失败原因：运行时错误 → 编译错误 → 答案错误时的用例对比
fn build_error_message(data: &CheckResponse, status: SubmissionStatus) -> Option<String> {
    let non_empty = |s: &Option<String>| s.as_ref().filter(|v| !v.trim().is_empty()).cloned();

    if let Some(msg) =
        non_empty(&data.full_runtime_error).or_else(|| non_empty(&data.compile_error))
    {
        return Some(msg);
    }

    if status != SubmissionStatus::WrongAnswer {
        return None;
    }

    let mut parts = Vec::new();
    if let Some(input) = non_empty(&data.last_testcase) {
        parts.push(format!("Input: {}", input));
    }
    if let Some(expected) = non_empty(&data.expected_output) {
        parts.push(format!("Expected: {}", expected));
    }
    if let Some(output) = data.code_output.as_ref().and_then(value_text) {
        parts.push(format!("Output: {}", output));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn submission_id_of(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(value_text).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        other => Some(other.to_string()),
    }
}

/// 解析运行时间，如 `"40 ms"` → 40
pub fn parse_runtime_ms(value: Option<&JsonValue>) -> Option<u32> {
    match value? {
        JsonValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        JsonValue::String(s) => s.replace("ms", "").trim().parse().ok(),
        _ => None,
    }
}

/// 解析内存占用，如 `"16.5 MB"` → 16.5
pub fn parse_memory_mb(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.replace("MB", "").trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_ms() {
        assert_eq!(parse_runtime_ms(Some(&json!("40 ms"))), Some(40));
        assert_eq!(parse_runtime_ms(Some(&json!("100"))), Some(100));
        assert_eq!(parse_runtime_ms(Some(&json!(7))), Some(7));
        assert_eq!(parse_runtime_ms(None), None);
        assert_eq!(parse_runtime_ms(Some(&json!("abc"))), None);
        assert_eq!(parse_runtime_ms(Some(&json!("N/A"))), None);
    }

    #[test]
    fn test_parse_memory_mb() {
        assert_eq!(parse_memory_mb(Some(&json!("16.5 MB"))), Some(16.5));
        assert_eq!(parse_memory_mb(Some(&json!("20.0"))), Some(20.0));
        assert_eq!(parse_memory_mb(None), None);
        assert_eq!(parse_memory_mb(Some(&json!("xyz"))), None);
    }

    #[test]
    fn test_error_message_prefers_runtime_error() {
        let data = CheckResponse {
            full_runtime_error: Some("IndexError: list index out of range".to_string()),
            compile_error: Some("ignored".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_error_message(&data, SubmissionStatus::RuntimeError).as_deref(),
            Some("IndexError: list index out of range")
        );
    }

    #[test]
    fn test_error_message_for_wrong_answer() {
        let data = CheckResponse {
            last_testcase: Some("[2,7,11,15]\n9".to_string()),
            expected_output: Some("[0,1]".to_string()),
            code_output: Some(json!("[1,0]")),
            ..Default::default()
        };
        let msg = build_error_message(&data, SubmissionStatus::WrongAnswer).unwrap();
        assert!(msg.contains("Input: [2,7,11,15]"));
        assert!(msg.contains("Expected: [0,1]"));
        assert!(msg.contains("Output: [1,0]"));

        assert_eq!(build_error_message(&data, SubmissionStatus::TimeLimit), None);
    }

    #[test]
    fn test_into_result() {
        let data: CheckResponse = serde_json::from_value(json!({
            "state": "SUCCESS",
            "status_code": 10,
            "status_runtime": "40 ms",
            "status_memory": "16.5 MB",
            "status_msg": "Accepted"
        }))
        .unwrap();
        let solution = Solution::new(1, "return [0, 1]", "gpt-4o", 1);

        let result = into_result(data, &solution);
        assert!(result.is_accepted());
        assert_eq!(result.runtime_ms, Some(40));
        assert_eq!(result.memory_mb, Some(16.5));
        assert_eq!(result.error_message, None);
        assert_eq!(result.solution, solution);
    }
}
