//! Hierarchy inference
//!
//! The provider trait and gateway client for AI-assisted document structure
//! analysis. Structure inference is best-effort by nature: the model's
//! output is parsed leniently and unparsable replies degrade to a stub
//! hierarchy with a parse warning rather than failing the request.

mod client;

pub use client::{GatewayClient, SYSTEM_PROMPT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::hierarchy::{HierarchyNode, Statistics};

/// Result of analyzing document text.
///
/// `title` is absent when the model did not report one; callers merging
/// into a final result fall back to PDF metadata or the file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub hierarchy: Vec<HierarchyNode>,
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_warning: Option<String>,
}

/// Hierarchy inference provider
#[async_trait]
pub trait HierarchyProvider: Send + Sync {
    /// Analyze document text and return its best-effort hierarchy.
    ///
    /// `page_breaks` carries the character offsets where pages begin; it is
    /// part of the request contract even though the current prompt does not
    /// consume it.
    async fn analyze(&self, text_content: &str, page_breaks: &[usize]) -> Result<Analysis, AiError>;
}

/// Errors from hierarchy inference.
///
/// Display strings are the user-facing messages passed through verbatim to
/// clients, so they are worded for end users.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service not configured")]
    NotConfigured,

    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("AI usage limit reached. Please add credits to continue.")]
    QuotaExhausted,

    #[error("Failed to analyze document")]
    Gateway { status: u16 },

    #[error("AI gateway unreachable: {0}")]
    Connection(String),

    #[error("No response from AI service")]
    EmptyResponse,
}

impl AiError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            Self::NotConfigured
            | Self::Gateway { .. }
            | Self::Connection(_)
            | Self::EmptyResponse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn error_status_mapping() {
        assert_eq!(AiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AiError::QuotaExhausted.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            AiError::NotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AiError::Gateway { status: 503 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert!(AiError::RateLimited.to_string().contains("Rate limit"));
        assert!(AiError::QuotaExhausted.to_string().contains("credits"));
        assert_eq!(AiError::NotConfigured.to_string(), "AI service not configured");
    }
}
