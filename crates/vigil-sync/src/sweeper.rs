//! Background purge of expired verdicts

use crate::config::{CachePolicy, SyncConfig};
use crate::metrics::SyncMetrics;
use crate::now_secs;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use vigil_domain::traits::VerdictStore;
use vigil_domain::StoreError;

/// Background worker that purges expired verdicts on a schedule
///
/// Lookups already ignore expired records; the sweeper only reclaims the
/// space. With indefinite caching every sweep is a no-op.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use vigil_store::SqliteStore;
/// use vigil_sync::{Sweeper, SyncConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(SqliteStore::new("vigil.db")?);
///     let sweeper = Sweeper::new(store, &SyncConfig::expiring(24));
///
///     // Run indefinitely (until Ctrl+C)
///     sweeper.run().await;
///     Ok(())
/// }
/// ```
pub struct Sweeper {
    store: Arc<dyn VerdictStore>,
    policy: CachePolicy,
    interval: Duration,
    metrics: Arc<SyncMetrics>,
}

impl Sweeper {
    /// Create a sweeper with the configured policy and interval
    pub fn new(store: Arc<dyn VerdictStore>, config: &SyncConfig) -> Self {
        Self {
            store,
            policy: config.cache_policy(),
            interval: config.sweep_interval(),
            metrics: Arc::new(SyncMetrics::new()),
        }
    }

    /// Share a metrics handle
    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Purge records that expired as of `now`
    pub async fn sweep_at(&self, now: u64) -> Result<usize, StoreError> {
        let Some(cutoff) = self.policy.cutoff(now) else {
            return Ok(0);
        };

        let purged = self.store.purge_older_than(cutoff).await?;
        self.metrics.record_purged(purged);
        Ok(purged)
    }

    /// Purge records that have expired by now
    pub async fn sweep_once(&self) -> Result<usize, StoreError> {
        self.sweep_at(now_secs()).await
    }

    async fn cycle(&self) -> usize {
        match self.sweep_once().await {
            Ok(purged) => {
                if purged > 0 {
                    tracing::info!(purged, "sweep completed");
                } else {
                    tracing::debug!("sweep completed: nothing expired");
                }
                purged
            }
            Err(e) => {
                tracing::error!(error = %e, "sweep failed");
                self.metrics.record_store_failure();
                0
            }
        }
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    ///
    /// Returns the total number of records purged.
    pub async fn run(&self) -> usize {
        if self.policy.ttl().is_none() {
            tracing::info!("verdicts never expire; sweeper idle");
        }

        let mut ticker = interval(self.interval);
        let mut total = 0;

        tracing::info!("Sweeper started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    total += self.cycle().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sweeper");
                    break;
                }
            }
        }

        tracing::info!("Sweeper stopped. Final metrics:\n{}", self.metrics.snapshot().summary());
        total
    }

    /// Run a fixed number of cycles (useful for testing)
    pub async fn run_cycles(&self, cycles: usize) -> usize {
        let mut ticker = interval(self.interval);
        let mut total = 0;

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);
            total += self.cycle().await;
        }

        total
    }
}
