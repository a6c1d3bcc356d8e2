//! Strata Server Library
//!
//! PDF hierarchy extraction service: uploads a PDF, extracts its text,
//! sends the text to an AI gateway for structure inference and serves the
//! resulting hierarchy as JSON, a downloadable export and a plain-text
//! outline.
//!
//! # Modules
//!
//! - `hierarchy`: Document hierarchy model and the fallback stub
//! - `pdf`: Pure-Rust PDF text extraction
//! - `ai`: Hierarchy inference provider trait and gateway client
//! - `pipeline`: Staged extraction state machine
//! - `routes`: HTTP surface

pub mod ai;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod pdf;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router.
///
/// CORS is fully open (the CorsLayer also answers preflight OPTIONS
/// requests); the body limit enforces the configured upload cap.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1/extract-hierarchy", routes::analyze::router())
        .nest("/api/v1/documents", routes::documents::router())
        .layer(DefaultBodyLimit::max(state.config().limits.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
