//! Hierarchy analysis route
//!
//! The inference service boundary: accepts raw document text plus
//! page-break offsets and returns a best-effort hierarchy. Unparsable model
//! output comes back as HTTP 200 with the fallback stub and a parse
//! warning; gateway quota and rate-limit failures map to 402 and 429.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::ai::Analysis;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the analyze router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze_text))
}

/// Analysis request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text_content: Option<String>,
    /// Character offsets where pages begin; forwarded to the provider
    #[serde(default)]
    pub page_breaks: Vec<usize>,
}

/// POST /api/v1/extract-hierarchy
async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Analysis>> {
    let text = request.text_content.as_deref().unwrap_or("");
    if text.is_empty() {
        return Err(AppError::BadRequest("Text content is required".to_string()));
    }

    let analysis = state.provider().analyze(text, &request.page_breaks).await?;
    Ok(Json(analysis))
}
