//! Document processing routes
//!
//! Endpoints:
//! - POST /api/v1/documents - Upload a PDF and run the extraction pipeline
//! - GET /api/v1/documents/status - Live processing status
//! - GET /api/v1/documents/result - Last committed extraction result
//! - GET /api/v1/documents/export - Result as a JSON file download
//! - GET /api/v1/documents/outline - Plain-text tree rendering
//! - POST /api/v1/documents/reset - Return the session to idle

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::hierarchy::{render_outline, ExtractionResult};
use crate::pipeline::ProcessingStatus;
use crate::state::AppState;

/// Fixed download filename for exported results
pub const EXPORT_FILENAME: &str = "document-hierarchy.json";

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_document))
        .route("/status", get(get_status))
        .route("/result", get(get_result))
        .route("/export", get(export_result))
        .route("/outline", get(get_outline))
        .route("/reset", post(reset_session))
}

/// Response for a completed upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: Uuid,
    pub file_name: String,
    pub result: ExtractionResult,
}

/// POST /api/v1/documents
///
/// Multipart upload with the PDF in a `file` field. Drives the pipeline to
/// completion; any stage failure aborts with the stage's error message.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("document.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((file_name, data));
            break;
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    // Extension filtering is advisory; the extractor rejects non-PDF bytes
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest("Only PDF files are supported".to_string()));
    }

    let result = state.pipeline().process(&file_name, &data).await?;

    Ok(Json(UploadResponse {
        id: Uuid::new_v4(),
        file_name,
        result,
    }))
}

/// Status response: the live stage snapshot plus the active file name
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: ProcessingStatus,
    pub file_name: Option<String>,
}

/// GET /api/v1/documents/status
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.session();
    Json(StatusResponse {
        status: session.status(),
        file_name: session.file_name(),
    })
}

/// GET /api/v1/documents/result
async fn get_result(State(state): State<AppState>) -> Result<Json<ExtractionResult>> {
    state
        .session()
        .result()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No extraction result available".to_string()))
}

/// GET /api/v1/documents/export
///
/// The exact 2-space-indented serialization of the in-memory result,
/// served as an attachment with a fixed filename.
async fn export_result(State(state): State<AppState>) -> Result<Response> {
    let result = state
        .session()
        .result()
        .ok_or_else(|| AppError::NotFound("No extraction result available".to_string()))?;

    let body = serde_json::to_string_pretty(&result)
        .map_err(|e| AppError::Internal(format!("Failed to serialize result: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                r#"attachment; filename="document-hierarchy.json""#,
            ),
        ],
        body,
    )
        .into_response())
}

/// Outline query parameters
#[derive(Debug, Deserialize)]
pub struct OutlineQuery {
    /// Maximum rendered depth; 0 renders the full tree. Defaults to 2,
    /// the tree view's default expansion.
    pub depth: Option<usize>,
}

/// GET /api/v1/documents/outline
async fn get_outline(
    State(state): State<AppState>,
    Query(query): Query<OutlineQuery>,
) -> Result<Response> {
    let result = state
        .session()
        .result()
        .ok_or_else(|| AppError::NotFound("No extraction result available".to_string()))?;

    let depth = match query.depth {
        Some(0) => None,
        Some(d) => Some(d),
        None => Some(2),
    };

    let outline = render_outline(&result.hierarchy, depth);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        outline,
    )
        .into_response())
}

/// POST /api/v1/documents/reset
async fn reset_session(State(state): State<AppState>) -> StatusCode {
    state.session().reset();
    StatusCode::NO_CONTENT
}
