//! Error types for relquery.
//!
//! Compiling a query never fails. Errors only come from loading the inputs:
//! metadata and query documents, and compiler configuration.

use thiserror::Error;

/// The main error type for relquery operations.
#[derive(Debug, Error)]
pub enum RelQueryError {
    /// Failed to decode a metadata or query JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode a TOML configuration document.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration value was present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelQueryError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for relquery operations.
pub type RelQueryResult<T> = Result<T, RelQueryError>;
