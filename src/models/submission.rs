use serde::{Deserialize, Serialize};

use crate::models::solution::Solution;

/// 判题结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimit,
    #[serde(rename = "Memory Limit Exceeded")]
    MemoryLimit,
    #[serde(rename = "Output Limit Exceeded")]
    OutputLimit,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Compile Error")]
    CompileError,
    #[serde(rename = "Internal Error")]
    InternalError,
    /// 无法识别的状态标签也归为此项
    #[serde(rename = "Unknown", other)]
    Unknown,
}

impl SubmissionStatus {
    /// 获取展示名称（同时也是落盘格式）
    pub fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Accepted => "Accepted",
            SubmissionStatus::WrongAnswer => "Wrong Answer",
            SubmissionStatus::TimeLimit => "Time Limit Exceeded",
            SubmissionStatus::MemoryLimit => "Memory Limit Exceeded",
            SubmissionStatus::OutputLimit => "Output Limit Exceeded",
            SubmissionStatus::RuntimeError => "Runtime Error",
            SubmissionStatus::CompileError => "Compile Error",
            SubmissionStatus::InternalError => "Internal Error",
            SubmissionStatus::Unknown => "Unknown",
        }
    }

    /// 从判题接口的 status_code 解析
    pub fn from_status_code(code: i64) -> Self {
        match code {
            10 => SubmissionStatus::Accepted,
            11 => SubmissionStatus::WrongAnswer,
            12 => SubmissionStatus::MemoryLimit,
            13 => SubmissionStatus::OutputLimit,
            14 => SubmissionStatus::TimeLimit,
            15 => SubmissionStatus::RuntimeError,
            16 => SubmissionStatus::InternalError,
            20 => SubmissionStatus::CompileError,
            _ => SubmissionStatus::Unknown,
        }
    }

    pub fn is_accepted(self) -> bool {
        self == SubmissionStatus::Accepted
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 一次提交的判题结果
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub problem_id: u32,
    pub status: SubmissionStatus,
    pub runtime_ms: Option<u32>,
    pub memory_mb: Option<f64>,
    pub error_message: Option<String>,
    pub solution: Solution,
}

impl SubmissionResult {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_code() {
        assert_eq!(SubmissionStatus::from_status_code(10), SubmissionStatus::Accepted);
        assert_eq!(SubmissionStatus::from_status_code(11), SubmissionStatus::WrongAnswer);
        assert_eq!(SubmissionStatus::from_status_code(14), SubmissionStatus::TimeLimit);
        assert_eq!(SubmissionStatus::from_status_code(15), SubmissionStatus::RuntimeError);
        assert_eq!(SubmissionStatus::from_status_code(20), SubmissionStatus::CompileError);
        assert_eq!(SubmissionStatus::from_status_code(-1), SubmissionStatus::Unknown);
    }

    #[test]
    fn test_label_matches_serde() {
        let all = [
            SubmissionStatus::Accepted,
            SubmissionStatus::WrongAnswer,
            SubmissionStatus::TimeLimit,
            SubmissionStatus::MemoryLimit,
            SubmissionStatus::OutputLimit,
            SubmissionStatus::RuntimeError,
            SubmissionStatus::CompileError,
            SubmissionStatus::InternalError,
            SubmissionStatus::Unknown,
        ];
        for status in all {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }

        let status: SubmissionStatus = serde_json::from_str("\"Presentation Error\"").unwrap();
        assert_eq!(status, SubmissionStatus::Unknown);
    }
}
