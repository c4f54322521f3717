//! Reddit API 客户端
//!
//! client_credentials 授权与提交信息查询

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::ratelimit::Retryable;

use super::auth::{Credentials, TokenResponse};
use super::types::{Listing, SubmissionId, SubmissionInfo};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 无法从链接解析提交 id
    #[error("Invalid submission URL: {0}")]
    InvalidUrl(String),

    /// API 返回非成功状态码
    #[error("Reddit API returned status {status} for {target}")]
    Status { status: u16, target: String },

    /// 提交不存在
    #[error("Submission {0} not found")]
    NotFound(String),

    /// 网络传输错误
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status: 429, .. } | ApiError::Transport(_)
        )
    }
}

/// 提交信息来源
///
/// 抽象出查询接口，测试中可用内存实现替代真实客户端。
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    async fn submission(&self, id: &SubmissionId) -> Result<SubmissionInfo, ApiError>;
}

/// Reddit API 客户端
///
/// 令牌在连接时获取一次，生命周期即单次运行，不做刷新。
pub struct RedditClient {
    http: reqwest::Client,
    token: String,
}

impl RedditClient {
    /// 连接并完成 OAuth 令牌交换
    pub async fn connect(credentials: &Credentials) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let token = fetch_token(&http, credentials).await?;
        Ok(Self { http, token })
    }
}

async fn fetch_token(
    http: &reqwest::Client,
    credentials: &Credentials,
) -> Result<String, ApiError> {
    let response = http
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            target: "access_token".to_string(),
        });
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

#[async_trait]
impl SubmissionSource for RedditClient {
    async fn submission(&self, id: &SubmissionId) -> Result<SubmissionInfo, ApiError> {
        let url = format!("{}/api/info?id={}&raw_json=1", API_BASE, id.fullname());
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                target: id.to_string(),
            });
        }

        let listing: Listing = response.json().await?;
        let child = listing
            .data
            .children
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        Ok(child.data.into())
    }
}
