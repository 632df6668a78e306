//! GitHub API client
//!
//! Minimal client for the handful of GitHub endpoints the fetch stage needs, plus plain GETs
//! against the package site and raw file host.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;

/// Repository metadata returned by `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
#[expect(clippy::struct_field_names, reason = "field names match GitHub API exactly")]
pub struct Repository {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// One page of `GET /search/repositories`
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of an API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded - contains data and optional rate limit info
    Success(T, Option<RateLimitInfo>),

    /// Rate limited - should retry after reset time
    RateLimited(RateLimitInfo),

    /// The requested resource was not found (404)
    NotFound(Option<RateLimitInfo>),

    /// Request failed permanently - should NOT retry
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

impl<T> ApiResult<T> {
    /// The rate limit info carried by this result, if any.
    pub const fn rate_limit(&self) -> Option<RateLimitInfo> {
        match self {
            Self::Success(_, rl) | Self::NotFound(rl) | Self::Failed(_, rl) => *rl,
            Self::RateLimited(rl) => Some(*rl),
        }
    }
}

/// HTTP client for the GitHub API and the package site
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new client with optional authentication token and GitHub API base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> crate::Result<Self> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};

        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent("elm-pkg-stats")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the GitHub API base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Construct API URL for a repository with optional path suffix
    #[must_use]
    pub fn repo_url(&self, name: &str, suffix: &str) -> String {
        format!("{}/repos/{name}{suffix}", self.base_url)
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &str) -> ApiResult<reqwest::Response> {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e.into(), None),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());

        let status = resp.status();
        if status.is_success() {
            return ApiResult::Success(resp, rate_limit);
        }

        // GitHub reports an exhausted quota as 403 with remaining == 0, secondary limits as 429
        let status_code = status.as_u16();
        let quota_exhausted = rate_limit.is_some_and(|rl| rl.remaining == 0);
        if status_code == 429 || (status_code == 403 && quota_exhausted) {
            let rate_limit = rate_limit.unwrap_or_else(|| RateLimitInfo {
                remaining: 0,
                reset_at: Utc::now() + chrono::Duration::minutes(1),
            });
            return ApiResult::RateLimited(rate_limit);
        }

        if status_code == 404 {
            return ApiResult::NotFound(rate_limit);
        }

        match resp.error_for_status() {
            Err(e) => ApiResult::Failed(e.into(), rate_limit),
            Ok(_) => ApiResult::Failed(ohno::app_err!("unexpected HTTP status {status}"), rate_limit),
        }
    }

    /// Make an API call and decode a JSON body
    pub async fn get_json<T>(&self, url: &str) -> ApiResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.api_call(url).await {
            ApiResult::Success(resp, rate_limit) => match resp.json().await {
                Ok(data) => ApiResult::Success(data, rate_limit),
                Err(e) => ApiResult::Failed(e.into(), rate_limit),
            },
            ApiResult::RateLimited(rl) => ApiResult::RateLimited(rl),
            ApiResult::NotFound(rl) => ApiResult::NotFound(rl),
            ApiResult::Failed(e, rl) => ApiResult::Failed(e, rl),
        }
    }

    /// Make an API call and return the body as text
    pub async fn get_text(&self, url: &str) -> ApiResult<String> {
        match self.api_call(url).await {
            ApiResult::Success(resp, rate_limit) => match resp.text().await {
                Ok(text) => ApiResult::Success(text, rate_limit),
                Err(e) => ApiResult::Failed(e.into(), rate_limit),
            },
            ApiResult::RateLimited(rl) => ApiResult::RateLimited(rl),
            ApiResult::NotFound(rl) => ApiResult::NotFound(rl),
            ApiResult::Failed(e, rl) => ApiResult::Failed(e, rl),
        }
    }
}

/// Extract rate limit information from API response headers
pub fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

/// Whether a `Link` header advertises a next page
pub fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|link_str| link_str.contains(r#"rel="next""#))
}
