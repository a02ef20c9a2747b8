//! Error types shared across trait boundaries

use thiserror::Error;

/// Errors from a verdict store
///
/// Callers treat every variant as a cache miss; neither is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing medium rejected the read or write (I/O, quota, lock)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored entry could not be decoded
    #[error("Corrupt entry: {0}")]
    Corrupt(String),
}

/// Errors from a classification gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, DNS)
    #[error("Classification service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status
    #[error("Classification rejected: {0}")]
    Rejected(String),

    /// The response body could not be read as a classification
    #[error("Malformed classification response: {0}")]
    Malformed(String),
}
