//! # Comments Backend
//!
//! Posts finalized comments to the market API. This sits on the far side
//! of the composition subsystem's trust boundary: the controller fires
//! and forgets, the compose screen's consumer task awaits the result here
//! and reports through the status line.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::content::Document;

/// Errors that can occur while talking to the comments API.
#[derive(Debug)]
pub enum ApiError {
    /// Backend misconfigured (bad URL, missing credentials). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the API's response. Not retryable.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Everything the backend needs to persist one comment.
pub struct PostCommentRequest<'a> {
    pub market_id: &'a str,
    pub content: &'a Document,
    pub wager_id: Option<&'a str>,
    pub parent_comment_id: Option<&'a str>,
    pub parent_answer_outcome: Option<&'a str>,
}

/// The persisted comment as acknowledged by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedComment {
    pub id: String,
    pub created_at: i64,
}

#[async_trait]
pub trait CommentBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Persists one comment, returning the stored record.
    async fn post_comment(&self, request: PostCommentRequest<'_>)
    -> Result<PostedComment, ApiError>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Wire body for `POST /comments`.
#[derive(Serialize, Debug)]
struct PostCommentBody<'a> {
    market_id: &'a str,
    content: &'a Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    wager_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_comment_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_answer_outcome: Option<&'a str>,
}

pub struct HttpBackend {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CommentBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn post_comment(
        &self,
        request: PostCommentRequest<'_>,
    ) -> Result<PostedComment, ApiError> {
        let url = format!("{}/comments", self.base_url);
        let body = PostCommentBody {
            market_id: request.market_id,
            content: request.content,
            wager_id: request.wager_id,
            parent_comment_id: request.parent_comment_id,
            parent_answer_outcome: request.parent_answer_outcome,
        };
        debug!(
            "POST {} ({} nodes, wager={:?})",
            url,
            request.content.nodes.len(),
            request.wager_id
        );

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let posted: PostedComment = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        info!("comment {} posted to market {}", posted.id, request.market_id);
        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::ContentNode;

    #[test]
    fn test_body_omits_absent_optionals() {
        let mut content = Document::new();
        content.push(ContentNode::text("hi"));
        let body = PostCommentBody {
            market_id: "m1",
            content: &content,
            wager_id: None,
            parent_comment_id: None,
            parent_answer_outcome: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("wager_id").is_none());
        assert!(json.get("parent_comment_id").is_none());
        assert_eq!(json["market_id"], "m1");
        assert_eq!(json["content"][0]["type"], "text");
    }

    #[test]
    fn test_body_includes_reply_fields() {
        let mut content = Document::new();
        content.push(ContentNode::mention("alice", "u1"));
        let body = PostCommentBody {
            market_id: "m1",
            content: &content,
            wager_id: Some("w9"),
            parent_comment_id: Some("c3"),
            parent_answer_outcome: Some("YES"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["wager_id"], "w9");
        assert_eq!(json["parent_comment_id"], "c3");
        assert_eq!(json["parent_answer_outcome"], "YES");
        assert_eq!(json["content"][0]["attrs"]["label"], "alice");
    }
}
