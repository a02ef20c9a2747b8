//! Error types for the synchronization core

use thiserror::Error;
use vigil_domain::GatewayError;

/// A resolution attempt that produced no verdict
///
/// Never cached and never retried automatically; the next resolve for the
/// same domain goes back to the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The classification service could not be reached
    #[error("Classification service unreachable: {0}")]
    GatewayUnreachable(String),

    /// The classification service answered but refused or failed the analysis
    #[error("Classification rejected: {0}")]
    GatewayRejected(String),
}

impl ResolutionError {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> &str {
        match self {
            ResolutionError::GatewayUnreachable(message) => message,
            ResolutionError::GatewayRejected(message) => message,
        }
    }
}

impl From<GatewayError> for ResolutionError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unreachable(message) => ResolutionError::GatewayUnreachable(message),
            GatewayError::Rejected(message) => ResolutionError::GatewayRejected(message),
            GatewayError::Malformed(message) => {
                ResolutionError::GatewayRejected(format!("Malformed response: {}", message))
            }
        }
    }
}

/// Errors from the surface notifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    /// Every subscriber slot is taken
    #[error("Subscriber limit reached ({0})")]
    SubscriberLimit(usize),
}
