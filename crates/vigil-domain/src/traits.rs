//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the synchronization core and
//! infrastructure. Implementations live in `vigil-store` and `vigil-gateway`.
//! Both are object-safe so components can share one injected handle
//! (`Arc<dyn VerdictStore>`) instead of reaching for a global.

use crate::{ClassificationResult, DomainName, GatewayError, StoreError, VerdictRecord};
use async_trait::async_trait;

/// Persistent domain -> verdict cache
///
/// Implemented by the infrastructure layer (vigil-store).
///
/// Writes are whole-record replacements keyed by `record.domain`. Concurrent
/// `put`s to the same key are not coordinated: the last one to complete wins.
#[async_trait]
pub trait VerdictStore: Send + Sync {
    /// Look up the record for a domain
    async fn get(&self, domain: &DomainName) -> Result<Option<VerdictRecord>, StoreError>;

    /// Insert or replace the record for `record.domain`
    async fn put(&self, record: VerdictRecord) -> Result<(), StoreError>;

    /// Remove one domain's record, returning whether it existed
    async fn evict(&self, domain: &DomainName) -> Result<bool, StoreError>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> Result<usize, StoreError>;

    /// Remove records classified before `cutoff` (seconds since Unix epoch)
    async fn purge_older_than(&self, cutoff: u64) -> Result<usize, StoreError>;

    /// Number of records currently held
    async fn len(&self) -> Result<usize, StoreError>;

    /// Whether the store holds no records
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}

/// Remote classification oracle
///
/// Implemented by the infrastructure layer (vigil-gateway). Any retry policy
/// belongs to the implementation; callers make a single attempt.
#[async_trait]
pub trait ClassificationGateway: Send + Sync {
    /// Classify a domain
    ///
    /// Returns the parsed payload for any response the service produced,
    /// including non-success statuses; the caller decides what a status
    /// means.
    async fn classify(&self, domain: &DomainName) -> Result<ClassificationResult, GatewayError>;
}
