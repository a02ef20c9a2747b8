//! Wiring of store, gateway and synchronization core from configuration.

use crate::config::{Config, StoreBackend};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use vigil_domain::traits::{ClassificationGateway, VerdictStore};
use vigil_gateway::HttpGateway;
use vigil_store::{MemoryStore, SqliteStore};
use vigil_sync::{PopupController, SurfaceNotifier, SyncMetrics, VerdictResolver};

/// Shared handles for one CLI invocation.
pub struct App {
    /// Effective configuration
    pub config: Config,
    /// Verdict store
    pub store: Arc<dyn VerdictStore>,
    /// Get-or-fetch resolver over the store
    pub resolver: Arc<VerdictResolver>,
    /// Repaint notifier
    pub notifier: SurfaceNotifier,
    /// Counters shared by every component
    pub metrics: Arc<SyncMetrics>,
}

impl App {
    /// Build every component; `memory` forces the in-memory store.
    pub fn build(config: Config, memory: bool) -> Result<Self> {
        let store = open_store(&config, memory)?;
        let gateway = HttpGateway::with_timeout(
            config.gateway.endpoint.clone(),
            Duration::from_secs(config.gateway.timeout_secs),
        )?
        .with_max_retries(config.gateway.max_retries);

        Ok(Self::with_parts(config, store, Arc::new(gateway)))
    }

    /// Assemble from an existing store and gateway.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn VerdictStore>,
        gateway: Arc<dyn ClassificationGateway>,
    ) -> Self {
        let metrics = Arc::new(SyncMetrics::new());
        let resolver = Arc::new(
            VerdictResolver::new(store.clone(), gateway)
                .with_policy(config.sync.cache_policy())
                .with_metrics(metrics.clone()),
        );
        let notifier = SurfaceNotifier::from_config(&config.sync).with_metrics(metrics.clone());

        Self {
            config,
            store,
            resolver,
            notifier,
            metrics,
        }
    }

    /// Popup controller sharing this app's resolver and notifier.
    pub fn popup(&self) -> PopupController {
        PopupController::new(self.resolver.clone(), self.notifier.clone())
    }
}

fn open_store(config: &Config, memory: bool) -> Result<Arc<dyn VerdictStore>> {
    if memory || config.store.backend == StoreBackend::Memory {
        tracing::debug!("using in-memory verdict store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(path = %path.display(), "opening verdict database");
    Ok(Arc::new(SqliteStore::new(&path)?))
}
