//! Vigil Domain Layer
//!
//! Core vocabulary for the domain-verdict cache: what a verdict is, how a
//! domain is normalized into a cache key, what the classification service
//! sends back, and the trait seams for storage and classification.
//!
//! ## Key Concepts
//!
//! - **DomainName**: normalized hostname, the cache key
//! - **VerdictRecord**: the immutable cached verdict for one domain
//! - **Safety**: tri-state view of a lookup (`Unknown` means "not cached")
//! - **ClassificationResult**: lenient parse of the remote service's reply
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure domain logic only, no I/O
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classification;
pub mod domain_name;
pub mod error;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use classification::{ClassificationResult, PolicyFinding};
pub use domain_name::{DomainName, UrlError};
pub use error::{GatewayError, StoreError};
pub use verdict::{Alternative, Safety, TrustScore, Verdict, VerdictRecord};
