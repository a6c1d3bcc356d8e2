//! Application state management

use std::sync::Arc;

use crate::ai::HierarchyProvider;
use crate::config::Config;
use crate::pipeline::{Pipeline, SessionState};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    provider: Arc<dyn HierarchyProvider>,
    session: SessionState,
}

impl AppState {
    /// Create application state around a hierarchy provider.
    ///
    /// The provider is injected rather than constructed here so tests can
    /// substitute a deterministic fake.
    pub fn new(config: Config, provider: Arc<dyn HierarchyProvider>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                provider,
                session: SessionState::new(),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the hierarchy provider
    pub fn provider(&self) -> Arc<dyn HierarchyProvider> {
        self.inner.provider.clone()
    }

    /// Get the processing session
    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    /// Build a pipeline over this state's session and provider
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.inner.session.clone(),
            self.inner.provider.clone(),
            self.inner.config.limits.clone(),
        )
    }
}
