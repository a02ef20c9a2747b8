//! In-memory verdict store
//!
//! Session-scoped: everything is gone when the process exits. Useful as the
//! default store for short-lived runs and as the reference implementation in
//! tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use vigil_domain::traits::VerdictStore;
use vigil_domain::{DomainName, StoreError, VerdictRecord};

/// HashMap-backed implementation of `VerdictStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<DomainName, VerdictRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = VerdictRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.domain.clone(), r))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl VerdictStore for MemoryStore {
    async fn get(&self, domain: &DomainName) -> Result<Option<VerdictRecord>, StoreError> {
        Ok(self.records.read().await.get(domain).cloned())
    }

    async fn put(&self, record: VerdictRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.domain.clone(), record);
        Ok(())
    }

    async fn evict(&self, domain: &DomainName) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(domain).is_some())
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        Ok(count)
    }

    async fn purge_older_than(&self, cutoff: u64) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.classified_at >= cutoff);
        Ok(before - records.len())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
