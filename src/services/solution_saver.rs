//! 解答文件写入服务 - 业务能力层
//!
//! 只负责"把生成的代码写到 solutions/"能力，不关心流程

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{AppResult, StorageError};
use crate::models::Solution;

/// 解答文件写入服务
///
/// 职责：
/// - 每道题一个 `<题号:04>.py` 文件
/// - 后一次尝试覆盖前一次
pub struct SolutionSaver {
    dir: PathBuf,
}

impl SolutionSaver {
    /// 创建新的写入服务
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 某道题的解答文件路径
    pub fn path_for(&self, problem_id: u32) -> PathBuf {
        self.dir.join(format!("{:04}.py", problem_id))
    }

    /// 写入解答文件
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn save(&self, solution: &Solution) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::WriteFailed {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(solution.problem_id);
        fs::write(&path, render(solution)).map_err(|source| StorageError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        debug!(
            "[题目 #{}] 解答已写入 {}",
            solution.problem_id,
            path.display()
        );
        Ok(path)
    }
}

/// 文件内容：注释头 + 代码
fn render(solution: &Solution) -> String {
    let mut header = vec![
        format!("# Problem #{}", solution.problem_id),
        format!("# Model: {}", solution.model_used),
        format!("# Attempt: {}", solution.attempt),
    ];

    if !solution.reasoning.trim().is_empty() {
        header.push("#".to_string());
        header.push("# Approach:".to_string());
        header.extend(solution.reasoning.lines().map(|line| {
            if line.trim().is_empty() {
                "#".to_string()
            } else {
                format!("# {}", line)
            }
        }));
    }

    format!("{}\n\n{}\n", header.join("\n"), solution.code)
}
