//! Extraction pipeline
//!
//! The asynchronous state machine sequencing PDF text extraction and AI
//! hierarchy inference for one document at a time:
//!
//! ```text
//! idle -> uploading -> extracting -> analyzing -> {complete | error}
//! ```
//!
//! Terminal states leave only via an explicit [`SessionState::reset`].
//! Stage updates are published on a watch channel so the status endpoint
//! observes progress live. Each run carries a monotonically increasing
//! attempt id; updates and the final commit are dropped once a newer
//! attempt has started, so only the most recent upload's result is ever
//! committed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::ai::{AiError, HierarchyProvider};
use crate::config::LimitsConfig;
use crate::hierarchy::ExtractionResult;
use crate::pdf::{self, PdfError};

/// Pipeline stage tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Uploading,
    Extracting,
    Analyzing,
    Complete,
    Error,
}

/// One live status snapshot. `progress` is a UI hint, not load-bearing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    pub stage: Stage,
    pub progress: u8,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingStatus {
    fn idle() -> Self {
        Self {
            stage: Stage::Idle,
            progress: 0,
            message: String::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Errors from a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not extract sufficient text from PDF. The document may be image-based or protected.")]
    InsufficientText,

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Upload superseded by a newer attempt")]
    Superseded,
}

impl PipelineError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::InsufficientText => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Pdf(_) => StatusCode::BAD_REQUEST,
            Self::Ai(e) => e.status_code(),
            Self::Superseded => StatusCode::CONFLICT,
        }
    }
}

/// Per-session processing state: the live status, the last committed result
/// and the attempt counter guarding against overlapping runs.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    status_tx: watch::Sender<ProcessingStatus>,
    result: Mutex<Option<ExtractionResult>>,
    file_name: Mutex<Option<String>>,
    attempts: AtomicU64,
}

impl SessionState {
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(ProcessingStatus::idle());
        Self {
            inner: Arc::new(SessionInner {
                status_tx,
                result: Mutex::new(None),
                file_name: Mutex::new(None),
                attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Start a new attempt: clears the previous result, records the file
    /// name and returns the attempt id that guards later writes.
    fn begin(&self, file_name: &str) -> u64 {
        let attempt = self.inner.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.result.lock() = None;
        *self.inner.file_name.lock() = Some(file_name.to_string());
        attempt
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.inner.attempts.load(Ordering::SeqCst) == attempt
    }

    /// Publish a status update; dropped when the attempt is stale.
    fn publish(&self, attempt: u64, stage: Stage, progress: u8, message: &str) -> bool {
        if !self.is_current(attempt) {
            debug!("Dropping stale status update from attempt {}", attempt);
            return false;
        }
        self.inner.status_tx.send_replace(ProcessingStatus {
            stage,
            progress,
            message: message.to_string(),
            updated_at: Utc::now(),
        });
        true
    }

    /// Commit a result; dropped when the attempt is stale.
    fn commit(&self, attempt: u64, result: ExtractionResult) -> bool {
        let mut slot = self.inner.result.lock();
        if !self.is_current(attempt) {
            debug!("Dropping stale result from attempt {}", attempt);
            return false;
        }
        *slot = Some(result);
        drop(slot);
        self.publish(attempt, Stage::Complete, 100, "Analysis complete!")
    }

    /// Return to idle from any state. Invalidates in-flight attempts.
    pub fn reset(&self) {
        self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        *self.inner.result.lock() = None;
        *self.inner.file_name.lock() = None;
        self.inner.status_tx.send_replace(ProcessingStatus::idle());
    }

    pub fn status(&self) -> ProcessingStatus {
        self.inner.status_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProcessingStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn result(&self) -> Option<ExtractionResult> {
        self.inner.result.lock().clone()
    }

    pub fn file_name(&self) -> Option<String> {
        self.inner.file_name.lock().clone()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// The extraction pipeline: sequences the collaborators for one upload.
pub struct Pipeline {
    session: SessionState,
    provider: Arc<dyn HierarchyProvider>,
    limits: LimitsConfig,
}

impl Pipeline {
    pub fn new(session: SessionState, provider: Arc<dyn HierarchyProvider>, limits: LimitsConfig) -> Self {
        Self {
            session,
            provider,
            limits,
        }
    }

    /// Process one uploaded PDF end to end.
    ///
    /// Any failure aborts the run immediately with no retry and no partial
    /// result; the triggering message lands in the error status.
    pub async fn process(&self, file_name: &str, bytes: &[u8]) -> Result<ExtractionResult, PipelineError> {
        let attempt = self.session.begin(file_name);
        info!(
            "Processing {} ({} bytes, attempt {})",
            file_name,
            bytes.len(),
            attempt
        );

        match self.run(attempt, file_name, bytes).await {
            Ok(result) => {
                info!(
                    "Extracted {} elements from {}",
                    result.statistics.total_nodes, file_name
                );
                Ok(result)
            }
            Err(PipelineError::Superseded) => {
                debug!("Attempt {} superseded, discarding outcome", attempt);
                Err(PipelineError::Superseded)
            }
            Err(e) => {
                error!("Processing {} failed: {}", file_name, e);
                self.session.publish(attempt, Stage::Error, 0, &e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self, attempt: u64, file_name: &str, bytes: &[u8]) -> Result<ExtractionResult, PipelineError> {
        self.advance(attempt, Stage::Uploading, 10, "Reading PDF file...")?;
        self.pause(self.limits.upload_delay_ms).await;

        self.advance(attempt, Stage::Extracting, 30, "Extracting text content...")?;
        let extraction = pdf::extract_text(bytes)?;

        if extraction.text_content.chars().count() < self.limits.min_text_chars {
            return Err(PipelineError::InsufficientText);
        }

        let message = format!("Extracted {} pages...", extraction.page_count);
        self.advance(attempt, Stage::Extracting, 50, &message)?;
        self.pause(self.limits.stage_delay_ms).await;

        self.advance(attempt, Stage::Analyzing, 60, "AI analyzing document structure...")?;
        let analysis = self
            .provider
            .analyze(&extraction.text_content, &extraction.page_breaks)
            .await?;

        self.advance(attempt, Stage::Analyzing, 90, "Building hierarchy tree...")?;
        self.pause(self.limits.stage_delay_ms).await;

        // Title preference: AI result, then PDF metadata, then the file name
        let title = analysis
            .title
            .or(extraction.metadata.title)
            .unwrap_or_else(|| file_name.trim_end_matches(".pdf").to_string());

        let result = ExtractionResult {
            title,
            hierarchy: analysis.hierarchy,
            statistics: analysis.statistics,
            parse_warning: analysis.parse_warning,
        };

        if !self.session.commit(attempt, result.clone()) {
            return Err(PipelineError::Superseded);
        }
        Ok(result)
    }

    fn advance(&self, attempt: u64, stage: Stage, progress: u8, message: &str) -> Result<(), PipelineError> {
        if self.session.publish(attempt, stage, progress, message) {
            Ok(())
        } else {
            Err(PipelineError::Superseded)
        }
    }

    async fn pause(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }
}
