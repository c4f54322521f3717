//! Reddit 数据类型
//!
//! 提交标识解析与 API 响应结构

use std::fmt;

use serde::Deserialize;
use url::Url;

use super::client::ApiError;

/// 提交标识（base36 id）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// 从提交链接解析 id
    ///
    /// 支持 `…/comments/<id>/…` 形式的永久链接和 `redd.it/<id>` 短链接。
    pub fn parse(url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(url).map_err(|_| ApiError::InvalidUrl(url.to_string()))?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|parts| parts.filter(|part| !part.is_empty()).collect())
            .unwrap_or_default();

        let id = if parsed.host_str() == Some("redd.it") {
            segments.first().copied()
        } else {
            segments
                .iter()
                .position(|segment| *segment == "comments")
                .and_then(|index| segments.get(index + 1))
                .copied()
        };

        match id {
            Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(Self(id.to_ascii_lowercase()))
            }
            _ => Err(ApiError::InvalidUrl(url.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// API fullname（t3_ 前缀）
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.0)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 提交元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionInfo {
    /// 评论数
    pub num_comments: u32,
    /// 是否锁定
    pub locked: bool,
    /// 是否归档
    pub archived: bool,
}

// /api/info 响应结构

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub data: SubmissionData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionData {
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub archived: bool,
}

impl From<SubmissionData> for SubmissionInfo {
    fn from(data: SubmissionData) -> Self {
        Self {
            num_comments: data.num_comments.max(0) as u32,
            locked: data.locked,
            archived: data.archived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permalink() {
        let id =
            SubmissionId::parse("https://www.reddit.com/r/rust/comments/1abc2d/some_title/")
                .unwrap();
        assert_eq!(id.as_str(), "1abc2d");
        assert_eq!(id.fullname(), "t3_1abc2d");
    }

    #[test]
    fn test_parse_permalink_without_slug() {
        let id = SubmissionId::parse("https://reddit.com/r/rust/comments/xyz987").unwrap();
        assert_eq!(id.as_str(), "xyz987");
    }

    #[test]
    fn test_parse_short_link() {
        let id = SubmissionId::parse("https://redd.it/1abc2d").unwrap();
        assert_eq!(id.as_str(), "1abc2d");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id =
            SubmissionId::parse("https://www.reddit.com/r/rust/comments/1ABC2D/title/").unwrap();
        assert_eq!(id.as_str(), "1abc2d");
    }

    #[test]
    fn test_parse_rejects_missing_comments_segment() {
        let err = SubmissionId::parse("https://www.reddit.com/r/rust/").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_url() {
        assert!(SubmissionId::parse("not a url").is_err());
        assert!(SubmissionId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_alphanumeric_id() {
        assert!(SubmissionId::parse("https://www.reddit.com/r/rust/comments/a%20b/").is_err());
    }

    #[test]
    fn test_submission_info_from_data() {
        let data = SubmissionData {
            num_comments: 7,
            locked: true,
            archived: false,
        };
        let info = SubmissionInfo::from(data);
        assert_eq!(info.num_comments, 7);
        assert!(info.locked);
        assert!(!info.archived);
    }

    #[test]
    fn test_submission_info_clamps_negative_count() {
        let data = SubmissionData {
            num_comments: -1,
            locked: false,
            archived: false,
        };
        assert_eq!(SubmissionInfo::from(data).num_comments, 0);
    }
}
