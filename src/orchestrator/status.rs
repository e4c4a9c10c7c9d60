//! 进度汇总
//!
//! 读取判题记录，统计已通过题目数和各判题状态的记录条数

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::AppResult;
use crate::services::ResultStore;

/// 判题记录汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    /// 已通过的题目数（去重）
    pub solved: usize,
    /// 各状态的记录条数
    pub by_status: BTreeMap<&'static str, usize>,
}

impl StatusSummary {
    pub fn from_store(store: &ResultStore) -> AppResult<Self> {
        Ok(Self {
            solved: store.solved_count(),
            by_status: store.status_counts()?,
        })
    }

    /// 记录总条数
    pub fn total_records(&self) -> usize {
        self.by_status.values().sum()
    }
}

impl Display for StatusSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solved problems: {}", self.solved)?;
        writeln!(f, "Total submissions: {}", self.total_records())?;
        for (status, count) in &self.by_status {
            writeln!(f, "  {:<24}{}", status, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Solution, SubmissionResult, SubmissionStatus};

    #[test]
    fn test_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ResultStore::open(dir.path().join("results.jsonl")).unwrap();
        for (id, status) in [
            (1, SubmissionStatus::WrongAnswer),
            (1, SubmissionStatus::Accepted),
            (2, SubmissionStatus::Accepted),
            (3, SubmissionStatus::CompileError),
        ] {
            store
                .save(&SubmissionResult {
                    problem_id: id,
                    status,
                    runtime_ms: None,
                    memory_mb: None,
                    error_message: None,
                    solution: Solution::new(id, "pass", "m", 1),
                })
                .unwrap();
        }

        let summary = StatusSummary::from_store(&store).unwrap();
        assert_eq!(summary.solved, 2);
        assert_eq!(summary.total_records(), 4);

        let text = summary.to_string();
        assert!(text.starts_with("Solved problems: 2\nTotal submissions: 4\n"));
        assert!(text.contains("Compile Error"));
    }
}
