//! LeetCode HTTP 通道 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端（含会话 Cookie），只暴露"发请求"的能力

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, REFERER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::error::{AppError, AppResult, LeetCodeError};

/// 单次请求超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// LeetCode HTTP 通道
///
/// 职责：
/// - 持有带会话信息的 HTTP 客户端
/// - 暴露 graphql() / post_json() / get_json() 能力
/// - 统一把 401/403/429 等状态码翻译成错误
/// - 不认识 Problem / Solution
#[derive(Clone)]
pub struct LeetCodeHttp {
    client: Client,
    base_url: String,
}

impl LeetCodeHttp {
    /// 创建新的 HTTP 通道
    ///
    /// # 参数
    /// - `base_url`: 站点地址，如 `https://leetcode.com`
    /// - `session`: `LEETCODE_SESSION` Cookie
    /// - `csrf_token`: `csrftoken` Cookie，同时作为 `X-CSRFToken` 请求头
    pub fn new(base_url: &str, session: &str, csrf_token: &str) -> AppResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            header_value(&format!("LEETCODE_SESSION={}; csrftoken={}", session, csrf_token))?,
        );
        headers.insert("X-CSRFToken", header_value(csrf_token)?);
        headers.insert(REFERER, header_value(&base_url)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::request_failed("client", e))?;

        Ok(Self { client, base_url })
    }

    /// 执行 GraphQL 查询，返回 `data` 字段
    ///
    /// # 参数
    /// - `query`: GraphQL 查询语句
    /// - `variables`: 查询变量
    pub async fn graphql(&self, query: &str, variables: JsonValue) -> AppResult<JsonValue> {
        let endpoint = "/graphql";
        let response = self
            .post_raw(endpoint, &json!({ "query": query, "variables": variables }))
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LeetCodeError::AuthExpired {
                    endpoint: endpoint.to_string(),
                }
                .into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LeetCodeError::RateLimited {
                    endpoint: endpoint.to_string(),
                }
                .into())
            }
            StatusCode::OK => {}
            _ => return Err(bad_status(endpoint, response).await),
        }

        let mut body: JsonValue = parse_json(endpoint, response).await?;
        if let Some(errors) = body.get("errors") {
            return Err(LeetCodeError::GraphQl {
                errors: errors.to_string(),
            }
            .into());
        }

        Ok(body
            .get_mut("data")
            .map(JsonValue::take)
            .unwrap_or_else(|| json!({})))
    }

    /// POST JSON 并解析响应
    ///
    /// 401 视为会话过期，429 视为限流，其余非 200 视为失败（含 Cloudflare 拦截的 403）
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &JsonValue,
    ) -> AppResult<T> {
        let response = self.post_raw(path, body).await?;
        match response.status() {
            StatusCode::OK => parse_json(path, response).await,
            StatusCode::UNAUTHORIZED => Err(LeetCodeError::AuthExpired {
                endpoint: path.to_string(),
            }
            .into()),
            StatusCode::TOO_MANY_REQUESTS => Err(LeetCodeError::RateLimited {
                endpoint: path.to_string(),
            }
            .into()),
            _ => Err(bad_status(path, response).await),
        }
    }

    /// GET 并在 200 时解析 JSON
    ///
    /// 非 200 返回 `Ok(None)`，由调用方决定是否继续
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(path, e))?;

        if response.status() != StatusCode::OK {
            debug!("GET {} 返回 {}", path, response.status());
            return Ok(None);
        }
        parse_json(path, response).await.map(Some)
    }

    async fn post_raw(&self, path: &str, body: &JsonValue) -> AppResult<Response> {
        let url = self.url(path);
        debug!("POST {}", url);

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::request_failed(path, e))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        AppError::Config(crate::error::ConfigError::Invalid(
            "会话信息包含非法的请求头字符".to_string(),
        ))
    })
}

async fn parse_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
    response.json::<T>().await.map_err(|source| {
        LeetCodeError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}

async fn bad_status(endpoint: &str, response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    LeetCodeError::BadStatus {
        endpoint: endpoint.to_string(),
        status,
        body: crate::utils::truncate_text(&body, 500),
    }
    .into()
}
