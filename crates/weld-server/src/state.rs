//! Application state.
//!
//! Shared state for all request handlers.

use weld_resolver::Resolver;

use crate::ServerConfig;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Resolver shared by all calls.
    pub(crate) resolver: Resolver,
    /// Key under which payload responses carry diagnostics.
    pub(crate) diagnostics_key: String,
    /// Log every resolution error as a warning.
    pub(crate) verbose: bool,
}

impl AppState {
    pub(crate) fn new(resolver: Resolver, config: &ServerConfig) -> Self {
        Self {
            resolver,
            diagnostics_key: config.diagnostics_key.clone(),
            verbose: config.verbose,
        }
    }
}
