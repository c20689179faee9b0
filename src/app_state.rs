//! Application state shared across all handlers.

use crate::config::Config;

/// Application state shared across handlers.
///
/// Read-only after startup; cloned into each request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}
