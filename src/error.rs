//! Error types for graph assembly and control-plane reconciliation.

use thiserror::Error;

/// Errors surfaced by entity construction, assembly and synchronization.
///
/// Partial relation failures and failed project-default lookups are not
/// represented here: they are logged and absorbed at their boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing stable id, malformed entity, dangling reference, bad settings,
    /// or mutation after initialization.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Remote {kind} not found: {id}")]
    RemoteNotFound { kind: String, id: String },

    #[error("Remote {operation} of {kind} '{id}' failed with HTTP {status}: {message}")]
    RemoteFailure {
        operation: String,
        kind: String,
        id: String,
        status: u16,
        message: String,
    },

    #[error("All {failed} relation creations failed for graph '{graph_id}'")]
    AggregateRelationFailure { graph_id: String, failed: usize },

    #[error("Definition document error: {0}")]
    Document(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RemoteFailure { status, .. } => Some(*status),
            ApiError::RemoteNotFound { .. } => Some(404),
            _ => None,
        }
    }
}
