//! 判题记录存储 - 业务能力层
//!
//! 只负责"读写 results.jsonl"能力：每行一条 JSON 记录，只追加不修改

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppResult, StorageError};
use crate::models::{Solution, SubmissionResult, SubmissionStatus};

/// 落盘的一行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub problem_id: u32,
    pub status: SubmissionStatus,
    pub runtime_ms: Option<u32>,
    pub memory_mb: Option<f64>,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_attempt")]
    pub attempt: u32,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn default_attempt() -> u32 {
    1
}

impl ResultRecord {
    fn from_result(result: &SubmissionResult) -> Self {
        Self {
            problem_id: result.problem_id,
            status: result.status,
            runtime_ms: result.runtime_ms,
            memory_mb: result.memory_mb,
            model: result.solution.model_used.clone(),
            attempt: result.solution.attempt,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            error_message: result.error_message.clone(),
        }
    }

    /// 还原为判题结果（记录中不含代码，`code` 为空）
    fn into_result(self) -> SubmissionResult {
        SubmissionResult {
            problem_id: self.problem_id,
            status: self.status,
            runtime_ms: self.runtime_ms,
            memory_mb: self.memory_mb,
            error_message: self.error_message,
            solution: Solution::new(self.problem_id, "", self.model, self.attempt),
        }
    }
}

/// 判题记录存储
pub struct ResultStore {
    path: PathBuf,
    solved: HashSet<u32>,
}

impl ResultStore {
    /// 打开记录文件，文件不存在时视为空
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let solved = read_records(&path)?
            .into_iter()
            .filter(|r| r.status.is_accepted())
            .map(|r| r.problem_id)
            .collect::<HashSet<_>>();

        info!(
            "📂 判题记录: {} (已通过 {} 道)",
            path.display(),
            solved.len()
        );

        Ok(Self { path, solved })
    }

    /// 本地记录中是否已通过
    pub fn is_solved(&self, problem_id: u32) -> bool {
        self.solved.contains(&problem_id)
    }

    /// 已通过的题目数（去重）
    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    /// 追加一条判题记录
    pub fn save(&mut self, result: &SubmissionResult) -> AppResult<()> {
        let record = ResultRecord::from_result(result);
        let mut line = serde_json::to_string(&record).map_err(StorageError::from)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_failed = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_failed)?;
        file.write_all(line.as_bytes()).map_err(write_failed)?;

        debug!(
            "[题目 #{}] 已记录判题结果: {}",
            result.problem_id, result.status
        );

        if result.is_accepted() {
            self.solved.insert(result.problem_id);
        }
        Ok(())
    }

    /// 某道题的全部记录，按写入顺序
    pub fn find_by_problem_id(&self, problem_id: u32) -> AppResult<Vec<SubmissionResult>> {
        Ok(read_records(&self.path)?
            .into_iter()
            .filter(|r| r.problem_id == problem_id)
            .map(ResultRecord::into_result)
            .collect())
    }

    /// 全部通过记录
    pub fn find_all_accepted(&self) -> AppResult<Vec<SubmissionResult>> {
        Ok(read_records(&self.path)?
            .into_iter()
            .filter(|r| r.status.is_accepted())
            .map(ResultRecord::into_result)
            .collect())
    }

    /// 按判题状态统计记录条数
    pub fn status_counts(&self) -> AppResult<BTreeMap<&'static str, usize>> {
        let mut counts = BTreeMap::new();
        for record in read_records(&self.path)? {
            *counts.entry(record.status.label()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

fn read_records(path: &Path) -> AppResult<Vec<ResultRecord>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| StorageError::CorruptRecord {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn result(problem_id: u32, status: SubmissionStatus, attempt: u32) -> SubmissionResult {
        SubmissionResult {
            problem_id,
            status,
            runtime_ms: Some(40),
            memory_mb: Some(16.5),
            error_message: None,
            solution: Solution::new(problem_id, "class Solution: pass", "gpt-4o", attempt),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("results.jsonl")).unwrap();
        assert!(!store.is_solved(1));
        assert_eq!(store.solved_count(), 0);
        assert!(store.find_all_accepted().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.jsonl");

        let mut store = ResultStore::open(&path).unwrap();
        let mut wrong = result(1, SubmissionStatus::WrongAnswer, 1);
        wrong.error_message = Some("Expected: [0,1]".to_string());
        store.save(&wrong).unwrap();
        assert!(!store.is_solved(1));

        store.save(&result(1, SubmissionStatus::Accepted, 2)).unwrap();
        store.save(&result(2, SubmissionStatus::TimeLimit, 1)).unwrap();
        assert!(store.is_solved(1));

        let reopened = ResultStore::open(&path).unwrap();
        assert!(reopened.is_solved(1));
        assert!(!reopened.is_solved(2));

        let history = reopened.find_by_problem_id(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, SubmissionStatus::WrongAnswer);
        assert_eq!(history[0].error_message.as_deref(), Some("Expected: [0,1]"));
        assert_eq!(history[1].solution.attempt, 2);
        assert_eq!(history[1].solution.code, "");
        assert_eq!(history[1].solution.language, "python3");

        let accepted = reopened.find_all_accepted().unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].runtime_ms, Some(40));
    }

    #[test]
    fn test_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let mut store = ResultStore::open(&path).unwrap();
        store.save(&result(7, SubmissionStatus::Accepted, 1)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["problem_id"], 7);
        assert_eq!(value["status"], "Accepted");
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["attempt"], 1);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_blank_lines_skipped_and_corrupt_line_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(
            &path,
            "\n{\"problem_id\":3,\"status\":\"Accepted\",\"runtime_ms\":null,\"memory_mb\":null,\
             \"model\":\"m\",\"attempt\":1,\"timestamp\":\"2024-01-01T00:00:00Z\"}\n\n",
        )
        .unwrap();
        let store = ResultStore::open(&path).unwrap();
        assert!(store.is_solved(3));

        fs::write(&path, "{\"problem_id\":3}\nnot json\n").unwrap();
        let err = ResultStore::open(&path).err().unwrap();
        assert!(matches!(
            err,
            AppError::Storage(StorageError::CorruptRecord { line: 1, .. })
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sparse_record_still_counts_as_solved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(
            &path,
            "{\"problem_id\":4,\"status\":\"Accepted\"}\n\
             {\"problem_id\":5,\"status\":\"Presentation Error\",\"model\":\"m\"}\n",
        )
        .unwrap();

        let store = ResultStore::open(&path).unwrap();
        assert!(store.is_solved(4));
        assert!(!store.is_solved(5));

        let history = store.find_by_problem_id(4).unwrap();
        assert_eq!(history[0].solution.attempt, 1);
        assert_eq!(history[0].solution.model_used, "");
        assert_eq!(store.status_counts().unwrap().get("Unknown"), Some(&1));
    }

    #[test]
    fn test_status_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ResultStore::open(dir.path().join("results.jsonl")).unwrap();
        store.save(&result(1, SubmissionStatus::WrongAnswer, 1)).unwrap();
        store.save(&result(1, SubmissionStatus::Accepted, 2)).unwrap();
        store.save(&result(2, SubmissionStatus::WrongAnswer, 1)).unwrap();

        let counts = store.status_counts().unwrap();
        assert_eq!(counts.get("Wrong Answer"), Some(&2));
        assert_eq!(counts.get("Accepted"), Some(&1));
        assert_eq!(store.solved_count(), 1);
    }
}
