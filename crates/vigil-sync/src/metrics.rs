//! Metrics collection for the synchronization core
//!
//! Counters are atomics so one `Arc<SyncMetrics>` can be shared by the
//! resolver, watcher, notifier and sweeper, which all run on independent
//! tasks.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters
#[derive(Debug, Default)]
pub struct SyncMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    fetches: AtomicU64,
    gateway_failures: AtomicU64,
    degraded: AtomicU64,
    store_failures: AtomicU64,
    stale_discarded: AtomicU64,
    notifications_delivered: AtomicU64,
    notifications_dropped: AtomicU64,
    purged: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Lookups answered from the store
    pub cache_hits: u64,
    /// Lookups that found nothing (or only an expired record)
    pub cache_misses: u64,
    /// Gateway calls made
    pub fetches: u64,
    /// Gateway calls that produced no verdict
    pub gateway_failures: u64,
    /// Success responses missing the verdict flag
    pub degraded: u64,
    /// Store reads or writes that failed
    pub store_failures: u64,
    /// Lookup results discarded because the page had moved on
    pub stale_discarded: u64,
    /// Notifications queued for a subscriber
    pub notifications_delivered: u64,
    /// Notifications nobody received
    pub notifications_dropped: u64,
    /// Records removed by the sweeper
    pub purged: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl SyncMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        bump(&self.cache_hits, 1);
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) {
        bump(&self.cache_misses, 1);
    }

    /// Record a gateway call
    pub fn record_fetch(&self) {
        bump(&self.fetches, 1);
    }

    /// Record a failed gateway call
    pub fn record_gateway_failure(&self) {
        bump(&self.gateway_failures, 1);
    }

    /// Record a degraded success response
    pub fn record_degraded(&self) {
        bump(&self.degraded, 1);
    }

    /// Record a store failure
    pub fn record_store_failure(&self) {
        bump(&self.store_failures, 1);
    }

    /// Record a discarded stale lookup
    pub fn record_stale_discarded(&self) {
        bump(&self.stale_discarded, 1);
    }

    /// Record notification delivery results
    pub fn record_notification(&self, delivered: usize, dropped: usize) {
        bump(&self.notifications_delivered, delivered as u64);
        bump(&self.notifications_dropped, dropped as u64);
    }

    /// Record purged records
    pub fn record_purged(&self, count: usize) {
        bump(&self.purged, count as u64);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
            fetches: load(&self.fetches),
            gateway_failures: load(&self.gateway_failures),
            degraded: load(&self.degraded),
            store_failures: load(&self.store_failures),
            stale_discarded: load(&self.stale_discarded),
            notifications_delivered: load(&self.notifications_delivered),
            notifications_dropped: load(&self.notifications_dropped),
            purged: load(&self.purged),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.cache_hits,
            &self.cache_misses,
            &self.fetches,
            &self.gateway_failures,
            &self.degraded,
            &self.store_failures,
            &self.stale_discarded,
            &self.notifications_delivered,
            &self.notifications_dropped,
            &self.purged,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl MetricsSnapshot {
    /// Share of lookups answered from the store, if any lookups happened
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        (total > 0).then(|| self.cache_hits as f64 / total as f64)
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Vigil Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Cache hits: {}", self.cache_hits),
            format!("Cache misses: {}", self.cache_misses),
        ];

        if let Some(ratio) = self.hit_ratio() {
            lines.push(format!("Hit ratio: {:.1}%", ratio * 100.0));
        }

        lines.push(String::new());
        lines.push(format!("Gateway fetches: {}", self.fetches));
        lines.push(format!("Gateway failures: {}", self.gateway_failures));
        lines.push(format!("Degraded responses: {}", self.degraded));
        lines.push(format!("Store failures: {}", self.store_failures));
        lines.push(format!("Stale results discarded: {}", self.stale_discarded));

        if self.notifications_delivered + self.notifications_dropped > 0 {
            lines.push(String::new());
            lines.push(format!("Notifications delivered: {}", self.notifications_delivered));
            lines.push(format!("Notifications dropped: {}", self.notifications_dropped));
        }

        if self.purged > 0 {
            lines.push(format!("Records purged: {}", self.purged));
        }

        lines.join("\n")
    }
}
