//! Error types for the CLI application.

use thiserror::Error;
use vigil_domain::{GatewayError, StoreError, UrlError};
use vigil_sync::NotifierError;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Verdict store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Classification gateway error
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// URL or domain could not be used
    #[error("{0}")]
    Url(#[from] UrlError),

    /// Notifier error
    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
