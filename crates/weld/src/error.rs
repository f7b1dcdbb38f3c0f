//! CLI error types.

use weld_config::ConfigError;
use weld_resolver::{RegistryError, ResolveError};
use weld_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Templates(#[from] RegistryError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}
