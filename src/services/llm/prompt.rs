//! 提示词构建与回复解析

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Problem, SubmissionResult};

/// 系统提示词
pub const SYSTEM_PROMPT: &str = "You are a competitive programming expert. \
Given a LeetCode problem, first explain your thought process and approach, \
then write a correct Python solution.\n\n\
Format your response as:\n\
## Approach\n\
<your reasoning: algorithm choice, time/space complexity analysis, key insights>\n\n\
## Solution\n\
```python\n\
<your code>\n\
```\n\n\
The code must complete the given function signature. \
Do not include the class definition if it's already in the starter code.";

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:python3?|py)?\s*\n(.*?)```").unwrap());
static APPROACH_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)##\s*Approach\s*\n(.*?)(?:##\s*Solution|```)").unwrap());
static BEFORE_FIRST_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)```").unwrap());

/// 构建用户提示词
///
/// 包含题面、起始代码，以及此前每次失败的判题结果和代码
pub fn build_user_prompt(problem: &Problem, previous_attempts: &[SubmissionResult]) -> String {
    let mut parts = vec![
        format!("Problem #{}: {}", problem.id, problem.title),
        format!("Difficulty: {}\n", problem.difficulty),
        problem.description.clone(),
        format!(
            "\nStarter code:\n```python\n{}\n```",
            problem.code_snippet
        ),
    ];

    for attempt in previous_attempts {
        let error_info = attempt
            .error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| format!("\nError: {}", m))
            .unwrap_or_default();

        parts.push(format!(
            "\nPrevious attempt failed with: {}{}\nCode:\n```python\n{}\n```",
            attempt.status, error_info, attempt.solution.code
        ));
    }

    if !previous_attempts.is_empty() {
        parts.push("\nFix the issues and provide a corrected solution.".to_string());
    }

    parts.join("\n")
}

/// 从回复中提取代码
///
/// 取第一个 python/py/无标注的代码块；没有代码块时返回整段回复
pub fn extract_code(text: &str) -> String {
    match CODE_BLOCK.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// 从回复中提取思路说明
///
/// 优先取 `## Approach` 段落，否则取第一个代码块之前的内容
pub fn extract_reasoning(text: &str) -> String {
    if let Some(caps) = APPROACH_SECTION.captures(text) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = BEFORE_FIRST_FENCE.captures(text) {
        return caps[1].trim().to_string();
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Solution, SubmissionStatus};

    fn problem() -> Problem {
        Problem {
            id: 1,
            title: "Two Sum".to_string(),
            slug: "two-sum".to_string(),
            difficulty: "Easy".to_string(),
            description: "Given an array of integers nums...".to_string(),
            code_snippet: "class Solution:\n    def twoSum(self):".to_string(),
            paid_only: false,
        }
    }

    #[test]
    fn test_basic_prompt() {
        let prompt = build_user_prompt(&problem(), &[]);
        assert!(prompt.starts_with("Problem #1: Two Sum\nDifficulty: Easy\n"));
        assert!(prompt.contains("```python\nclass Solution:\n    def twoSum(self):\n```"));
        assert!(!prompt.contains("Previous attempt"));
        assert!(!prompt.contains("Fix the issues"));
    }

    #[test]
    fn test_prompt_with_previous_attempts() {
        let attempt = SubmissionResult {
            problem_id: 1,
            status: SubmissionStatus::WrongAnswer,
            runtime_ms: None,
            memory_mb: None,
            error_message: Some("Expected [0,1] but got [1,0]".to_string()),
            solution: Solution::new(1, "return [0, 0]", "gpt-4o", 1),
        };

        let prompt = build_user_prompt(&problem(), &[attempt]);
        assert!(
            prompt.contains("Previous attempt failed with: Wrong Answer\nError: Expected [0,1]")
        );
        assert!(prompt.contains("```python\nreturn [0, 0]\n```"));
        assert!(prompt.ends_with("Fix the issues and provide a corrected solution."));
    }

    #[test]
    fn test_system_prompt() {
        assert!(SYSTEM_PROMPT.contains("Python"));
        assert!(SYSTEM_PROMPT.contains("## Approach"));
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("Here's the solution:\n```python\ndef solve(): pass\n```"),
            "def solve(): pass"
        );
        assert_eq!(extract_code("```python3\ndef solve(): pass\n```"), "def solve(): pass");
        assert_eq!(extract_code("```\ndef solve(): pass\n```"), "def solve(): pass");
        assert_eq!(extract_code("def solve(): pass"), "def solve(): pass");
        assert_eq!(extract_code(""), "");
    }

    #[test]
    fn test_extract_reasoning() {
        let reply = "## Approach\nUse a hash map. O(n).\n\n## Solution\n```python\npass\n```";
        assert_eq!(extract_reasoning(reply), "Use a hash map. O(n).");

        let reply = "Two pointers work here.\n```python\npass\n```";
        assert_eq!(extract_reasoning(reply), "Two pointers work here.");

        assert_eq!(extract_reasoning("no code at all"), "");
    }
}
