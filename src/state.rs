//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::config::Config;
use crate::services::MeetRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Live meets keyed by id
    meets: MeetRegistry,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state with no meets scheduled
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                meets: MeetRegistry::new(),
                config,
            }),
        }
    }

    /// Get a reference to the meet registry
    pub fn meets(&self) -> &MeetRegistry {
        &self.inner.meets
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
