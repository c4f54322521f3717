//! API 凭据
//!
//! 从环境变量加载 Reddit 应用凭据

use std::env;

use serde::Deserialize;
use thiserror::Error;

/// 凭据加载错误
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
}

/// Reddit 应用凭据
#[derive(Debug, Clone)]
pub struct Credentials {
    /// 应用 client id
    pub client_id: String,
    /// 应用 client secret
    pub client_secret: String,
    /// 请求 User-Agent
    pub user_agent: String,
}

impl Credentials {
    /// 从环境变量读取凭据
    pub fn from_env() -> Result<Self, CredentialsError> {
        Ok(Self {
            client_id: require("CLIENT_ID")?,
            client_secret: require("CLIENT_SECRET")?,
            user_agent: require("USER_AGENT")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, CredentialsError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(CredentialsError::Missing(name))
}

/// 令牌接口响应
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}
