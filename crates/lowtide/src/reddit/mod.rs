//! Reddit API 访问
//!
//! OAuth 认证、提交元数据获取与错误分类

mod auth;
mod client;
mod types;

pub use auth::{Credentials, CredentialsError};
pub use client::{ApiError, RedditClient, SubmissionSource};
pub use types::{SubmissionId, SubmissionInfo};
