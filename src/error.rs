//! Error types for the Strata server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ai::AiError;
use crate::pdf::PdfError;
use crate::pipeline::PipelineError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Error response body.
///
/// `error` carries the user-facing message verbatim; clients surface it
/// without rewording.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ai(e) => e.status_code(),
            AppError::Pdf(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(e) => e.status_code(),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }

        let body = Json(ErrorResponse {
            error: self.message(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_errors_keep_their_status() {
        assert_eq!(
            AppError::Ai(AiError::RateLimited).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Ai(AiError::QuotaExhausted).status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn pdf_errors_are_bad_requests() {
        let err = AppError::Pdf(PdfError::Encrypted);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("encrypted"));
    }
}
