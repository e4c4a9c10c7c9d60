//! LeetCode 题目服务 - 业务能力层
//!
//! 负责"查题"与"交题"能力：维护题号 → slug 映射表，拉取题面与起始代码，提交解答

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, LeetCodeError};
use crate::infrastructure::LeetCodeHttp;
use crate::models::{Problem, Solution, SubmissionResult, PYTHON3};
use crate::services::submitter::{self, PollPolicy};
use crate::utils::html::strip_html;

/// 题目列表分页大小
const PAGE_SIZE: u32 = 100;

const PROBLEM_QUERY: &str = r#"
query questionData($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        questionId
        questionFrontendId
        title
        titleSlug
        difficulty
        content
        isPaidOnly
        codeSnippets {
            langSlug
            code
        }
    }
}
"#;

const PROBLEM_LIST_QUERY: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
    problemsetQuestionList: questionList(
        categorySlug: $categorySlug
        limit: $limit
        skip: $skip
        filters: $filters
    ) {
        total: totalNum
        questions: data {
            questionFrontendId
            titleSlug
            isPaidOnly
        }
    }
}
"#;

/// 判题平台能力
///
/// 流程层只依赖这个 trait，测试时可以替换为内存实现
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// 拉取题目；题号不存在时返回 `None`
    async fn fetch_problem(&self, problem_id: u32) -> AppResult<Option<Problem>>;

    /// 提交解答并等待判题结果
    async fn submit(&self, solution: &Solution) -> AppResult<SubmissionResult>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionListPage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    questions: Vec<QuestionListItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionListItem {
    question_frontend_id: String,
    title_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDetail {
    question_frontend_id: String,
    title: String,
    title_slug: String,
    #[serde(default)]
    difficulty: String,
    content: Option<String>,
    #[serde(default)]
    is_paid_only: bool,
    code_snippets: Option<Vec<CodeSnippet>>,
}

/// 题目的某种语言起始代码
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    pub lang_slug: String,
    pub code: String,
}

/// LeetCode 客户端
///
/// 职责：
/// - 构建并持有题号 → slug 映射表（每次运行构建一次）
/// - 拉取题目详情与已解决题目列表
/// - 委托 submitter 提交解答并轮询判题结果
pub struct LeetCodeClient {
    http: LeetCodeHttp,
    slug_map: HashMap<u32, String>,
    poll: PollPolicy,
}

impl LeetCodeClient {
    /// 创建新的 LeetCode 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = LeetCodeHttp::new(
            &config.leetcode_base_url,
            &config.leetcode_session,
            &config.csrf_token,
        )?;
        Ok(Self::with_http(http, PollPolicy::from_config(config)))
    }

    pub fn with_http(http: LeetCodeHttp, poll: PollPolicy) -> Self {
        Self {
            http,
            slug_map: HashMap::new(),
            poll,
        }
    }

    /// 映射表中的题目数量
    pub fn slug_count(&self) -> usize {
        self.slug_map.len()
    }

    /// 构建题号 → slug 映射表
    pub async fn build_slug_map(&mut self) -> AppResult<()> {
        let questions = self.list_questions(json!({})).await?;

        self.slug_map = questions
            .into_iter()
            .filter_map(|q| {
                q.question_frontend_id
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .map(|id| (id, q.title_slug))
            })
            .collect();

        info!("✓ 题号映射表构建完成，共 {} 道题目", self.slug_map.len());
        Ok(())
    }

    /// 获取当前账号已通过的题号
    pub async fn fetch_solved_ids(&self) -> AppResult<HashSet<u32>> {
        let questions = self.list_questions(json!({ "status": "AC" })).await?;

        let solved: HashSet<u32> = questions
            .iter()
            .filter_map(|q| q.question_frontend_id.trim().parse().ok())
            .collect();

        info!("✓ 账号已通过 {} 道题目", solved.len());
        Ok(solved)
    }

    /// 分页拉取题目列表
    async fn list_questions(&self, filters: JsonValue) -> AppResult<Vec<QuestionListItem>> {
        let mut all_questions = Vec::new();
        let mut skip = 0u32;

        loop {
            let data = self
                .http
                .graphql(
                    PROBLEM_LIST_QUERY,
                    json!({
                        "categorySlug": "",
                        "limit": PAGE_SIZE,
                        "skip": skip,
                        "filters": filters,
                    }),
                )
                .await?;

            let page: QuestionListPage = match data.get("problemsetQuestionList") {
                Some(list) if !list.is_null() => serde_json::from_value(list.clone())
                    .map_err(|_| LeetCodeError::MissingField {
                        endpoint: "/graphql".to_string(),
                        field: "problemsetQuestionList",
                        body: list.to_string(),
                    })?,
                _ => break,
            };

            if page.questions.is_empty() {
                break;
            }
            debug!(
                "题目列表: skip={} 本页 {} 道 / 共 {} 道",
                skip,
                page.questions.len(),
                page.total
            );
            all_questions.extend(page.questions);

            skip += PAGE_SIZE;
            if skip >= page.total {
                break;
            }
        }

        Ok(all_questions)
    }

    fn slug_of(&self, problem_id: u32) -> AppResult<&str> {
        self.slug_map
            .get(&problem_id)
            .map(String::as_str)
            .ok_or_else(|| LeetCodeError::UnknownProblem { problem_id }.into())
    }
}

#[async_trait]
impl JudgeClient for LeetCodeClient {
    async fn fetch_problem(&self, problem_id: u32) -> AppResult<Option<Problem>> {
        if self.slug_map.is_empty() {
            return Err(LeetCodeError::SlugMapNotBuilt.into());
        }

        let Some(slug) = self.slug_map.get(&problem_id) else {
            warn!("[题目 #{}] ⚠️ 映射表中不存在该题号", problem_id);
            return Ok(None);
        };

        let data = self
            .http
            .graphql(PROBLEM_QUERY, json!({ "titleSlug": slug }))
            .await?;

        let question = match data.get("question") {
            Some(q) if !q.is_null() => q.clone(),
            _ => return Ok(None),
        };

        let body = question.to_string();
        let detail: QuestionDetail =
            serde_json::from_value(question).map_err(|_| LeetCodeError::MissingField {
                endpoint: "/graphql".to_string(),
                field: "question",
                body,
            })?;

        Ok(Some(parse_problem(detail, problem_id)))
    }

    async fn submit(&self, solution: &Solution) -> AppResult<SubmissionResult> {
        let slug = self.slug_of(solution.problem_id)?;
        submitter::submit_solution(&self.http, slug, solution, &self.poll).await
    }
}

fn parse_problem(detail: QuestionDetail, fallback_id: u32) -> Problem {
    let snippets = detail.code_snippets.unwrap_or_default();
    Problem {
        id: detail
            .question_frontend_id
            .trim()
            .parse()
            .unwrap_or(fallback_id),
        title: detail.title,
        slug: detail.title_slug,
        difficulty: detail.difficulty,
        description: strip_html(detail.content.as_deref().unwrap_or_default()),
        code_snippet: extract_code_snippet(&snippets, PYTHON3),
        paid_only: detail.is_paid_only,
    }
}

/// 选出指定语言的起始代码，不存在时返回空字符串
pub fn extract_code_snippet(snippets: &[CodeSnippet], lang: &str) -> String {
    snippets
        .iter()
        .find(|s| s.lang_slug == lang)
        .map(|s| s.code.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(lang: &str, code: &str) -> CodeSnippet {
        CodeSnippet {
            lang_slug: lang.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_extract_code_snippet() {
        let snippets = vec![
            snippet("java", "class Solution {}"),
            snippet("python3", "class Solution:\n    def twoSum(self):"),
            snippet("cpp", "class Solution {};"),
        ];
        assert!(extract_code_snippet(&snippets, PYTHON3).contains("def twoSum"));
        assert_eq!(extract_code_snippet(&snippets[..1], PYTHON3), "");
        assert_eq!(extract_code_snippet(&[], PYTHON3), "");
        assert_eq!(
            extract_code_snippet(&[snippet("golang", "func twoSum()")], "golang"),
            "func twoSum()"
        );
    }

    #[test]
    fn test_parse_problem() {
        let detail: QuestionDetail = serde_json::from_value(json!({
            "questionId": "1",
            "questionFrontendId": "1",
            "title": "Two Sum",
            "titleSlug": "two-sum",
            "difficulty": "Easy",
            "content": "<p>Given an array of integers <code>nums</code></p>",
            "isPaidOnly": false,
            "codeSnippets": [{ "langSlug": "python3", "code": "class Solution:" }]
        }))
        .unwrap();

        let problem = parse_problem(detail, 1);
        assert_eq!(problem.id, 1);
        assert_eq!(problem.slug, "two-sum");
        assert_eq!(problem.description, "Given an array of integers nums");
        assert_eq!(problem.code_snippet, "class Solution:");
        assert!(problem.is_solvable());
    }

    #[test]
    fn test_parse_problem_null_content() {
        let detail: QuestionDetail = serde_json::from_value(json!({
            "questionFrontendId": "7",
            "title": "Locked",
            "titleSlug": "locked",
            "difficulty": "Hard",
            "content": null,
            "isPaidOnly": true,
            "codeSnippets": null
        }))
        .unwrap();

        let problem = parse_problem(detail, 7);
        assert_eq!(problem.description, "");
        assert_eq!(problem.code_snippet, "");
        assert!(!problem.is_solvable());
    }
}
