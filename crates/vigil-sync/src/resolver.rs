//! Get-or-fetch resolution of domain verdicts
//!
//! `lookup` is the read-only path used by navigation and the banner: it
//! only ever consults the store. `resolve` is the popup path: on a miss it
//! asks the classification gateway once and writes the result back.
//!
//! Nothing is written unless the gateway produced a complete successful
//! classification, so a failed attempt leaves the domain uncached and the
//! next resolve tries the gateway again.

use crate::config::CachePolicy;
use crate::error::ResolutionError;
use crate::metrics::SyncMetrics;
use crate::now_secs;
use std::sync::Arc;
use vigil_domain::traits::{ClassificationGateway, VerdictStore};
use vigil_domain::{ClassificationResult, DomainName, TrustScore, Verdict, VerdictRecord};

/// Store-first verdict resolver
///
/// Concurrent resolves for the same uncached domain are not de-duplicated:
/// each calls the gateway and writes its own record, and the last write
/// wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vigil_sync::VerdictResolver;
/// use vigil_store::MemoryStore;
/// use vigil_gateway::MockGateway;
/// use vigil_domain::DomainName;
///
/// let gateway = MockGateway::new();
/// gateway.add_response("a.com", serde_json::json!({"status": "success", "is_safe": true, "trust_score": 9}));
/// let resolver = VerdictResolver::new(Arc::new(MemoryStore::new()), Arc::new(gateway.clone()));
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let domain = DomainName::new("a.com").unwrap();
/// let record = rt.block_on(resolver.resolve(&domain)).unwrap();
/// assert!(record.is_safe());
///
/// // Second resolve is served from the store
/// rt.block_on(resolver.resolve(&domain)).unwrap();
/// assert_eq!(gateway.call_count(), 1);
/// ```
pub struct VerdictResolver {
    store: Arc<dyn VerdictStore>,
    gateway: Arc<dyn ClassificationGateway>,
    policy: CachePolicy,
    metrics: Arc<SyncMetrics>,
}

impl VerdictResolver {
    /// Create a resolver with indefinite caching
    pub fn new(store: Arc<dyn VerdictStore>, gateway: Arc<dyn ClassificationGateway>) -> Self {
        Self {
            store,
            gateway,
            policy: CachePolicy::indefinite(),
            metrics: Arc::new(SyncMetrics::new()),
        }
    }

    /// Set the cache expiry policy
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a metrics handle with other components
    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Underlying store handle
    pub fn store(&self) -> &Arc<dyn VerdictStore> {
        &self.store
    }

    /// Metrics handle
    pub fn metrics(&self) -> &Arc<SyncMetrics> {
        &self.metrics
    }

    /// Active cache policy
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Read the cached verdict without ever contacting the gateway
    ///
    /// Store failures and expired records both read as a miss.
    pub async fn lookup(&self, domain: &DomainName) -> Option<VerdictRecord> {
        let record = match self.store.get(domain).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "verdict store read failed; treating as cache miss");
                self.metrics.record_store_failure();
                None
            }
        };

        match record {
            Some(record) if self.policy.is_fresh(&record, now_secs()) => {
                tracing::debug!(domain = %domain, verdict = record.verdict.as_str(), "cache hit");
                self.metrics.record_cache_hit();
                Some(record)
            }
            Some(record) => {
                tracing::debug!(domain = %domain, classified_at = record.classified_at, "cached verdict expired");
                self.metrics.record_cache_miss();
                None
            }
            None => {
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    /// Return the cached verdict, or classify the domain and cache the result
    ///
    /// Single attempt: gateway failures are returned, not retried, and
    /// leave the store untouched. A failed store write is logged and the
    /// fresh verdict is still returned.
    pub async fn resolve(&self, domain: &DomainName) -> Result<VerdictRecord, ResolutionError> {
        if let Some(record) = self.lookup(domain).await {
            return Ok(record);
        }

        tracing::info!(domain = %domain, "classifying uncached domain");
        self.metrics.record_fetch();

        let result = match self.gateway.classify(domain).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "classification failed");
                self.metrics.record_gateway_failure();
                return Err(e.into());
            }
        };

        if !result.is_success() {
            let message = result.failure_message();
            tracing::warn!(domain = %domain, status = %result.status, message = %message, "classification rejected");
            self.metrics.record_gateway_failure();
            return Err(ResolutionError::GatewayRejected(message));
        }

        let (record, degraded) = build_record(domain, result, now_secs());
        if degraded {
            tracing::warn!(domain = %domain, "success response without a verdict; degrading to unsafe");
            self.metrics.record_degraded();
        }

        match self.store.put(record.clone()).await {
            Ok(()) => {
                tracing::info!(domain = %domain, verdict = record.verdict.as_str(), trust_score = record.trust_score.value(), "verdict cached");
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "verdict store write failed; verdict not cached");
                self.metrics.record_store_failure();
            }
        }

        Ok(record)
    }

    /// Drop one domain's cached verdict so the next resolve reclassifies it
    pub async fn invalidate(&self, domain: &DomainName) -> bool {
        match self.store.evict(domain).await {
            Ok(existed) => existed,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "verdict store eviction failed");
                self.metrics.record_store_failure();
                false
            }
        }
    }
}

/// Turn a successful classification into a record
///
/// Returns `true` alongside the record when the payload had no verdict
/// flag and was degraded to unsafe-with-no-detail.
pub(crate) fn build_record(
    domain: &DomainName,
    result: ClassificationResult,
    now: u64,
) -> (VerdictRecord, bool) {
    let (verdict, degraded) = match result.is_safe {
        Some(is_safe) => (Verdict::from_is_safe(is_safe), false),
        None => (Verdict::Unsafe, true),
    };

    let trust_score = if degraded {
        TrustScore::default()
    } else {
        TrustScore::clamped(result.trust_score.unwrap_or(0))
    };

    let record = VerdictRecord::new(
        domain.clone(),
        verdict,
        trust_score,
        result.alternatives,
        result.raw,
        now,
    );

    (record, degraded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::Alternative;

    fn domain(s: &str) -> DomainName {
        DomainName::new(s).unwrap()
    }

    #[test]
    fn test_build_safe_record() {
        let result = ClassificationResult::from_json(
            r#"{"status":"success","is_safe":true,"trust_score":9,"alternatives":[{"domain":"b.com"}]}"#,
        )
        .unwrap();

        let (record, degraded) = build_record(&domain("a.com"), result, 77);
        assert!(!degraded);
        assert_eq!(record.verdict, Verdict::Safe);
        assert_eq!(record.trust_score.value(), 9);
        assert!(record.alternatives.is_empty());
        assert_eq!(record.classified_at, 77);
        assert!(record.raw.contains("\"trust_score\":9"));
    }

    #[test]
    fn test_build_unsafe_record_clamps_score() {
        let result = ClassificationResult::from_json(
            r#"{"status":"success","is_safe":false,"trust_score":-1,"alternatives":[{"domain":"b.com"}]}"#,
        )
        .unwrap();

        let (record, degraded) = build_record(&domain("a.com"), result, 0);
        assert!(!degraded);
        assert_eq!(record.verdict, Verdict::Unsafe);
        assert_eq!(record.trust_score.value(), 0);
        assert_eq!(record.alternatives, vec![Alternative::new("b.com", "https://b.com")]);
    }

    #[test]
    fn test_missing_verdict_degrades_to_unsafe() {
        let result = ClassificationResult::from_json(r#"{"status":"success","trust_score":8}"#).unwrap();

        let (record, degraded) = build_record(&domain("a.com"), result, 0);
        assert!(degraded);
        assert_eq!(record.verdict, Verdict::Unsafe);
        assert_eq!(record.trust_score.value(), 0);
    }
}
