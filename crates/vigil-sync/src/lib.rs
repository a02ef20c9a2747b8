//! Vigil Synchronization Core
//!
//! The single source of truth for "is this domain trusted" and the protocol
//! that keeps the badge, the in-page banner and the popup consistent with
//! it while the user navigates.
//!
//! # Components
//!
//! - [`VerdictResolver`]: get-or-fetch over an injected store and gateway
//! - [`NavigationWatcher`]: per-context badge driver (cache reads only)
//! - [`SurfaceNotifier`]: bounded, best-effort repaint notifications
//! - [`BadgeListener`]: repaints the badge from notifications
//! - [`PopupController`] / [`BannerView`]: presentation input contracts
//! - [`Sweeper`]: background purge of expired verdicts
//!
//! # Concurrency
//!
//! Every store and gateway call is a suspension point. Concurrent resolves
//! for the same uncached domain each call the gateway (no single-flight);
//! both write and the last write wins. The watcher tags every lookup with a
//! token so a slow lookup for a page the user already left cannot repaint
//! the badge.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use vigil_domain::DomainName;
//! use vigil_gateway::MockGateway;
//! use vigil_store::MemoryStore;
//! use vigil_sync::{
//!     ContextId, NavigationWatcher, PopupController, RecordingSurface, SurfaceNotifier,
//!     VerdictResolver,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = MockGateway::new();
//! gateway.add_response("b.com", serde_json::json!({"status": "success", "is_safe": false, "trust_score": 2}));
//!
//! let resolver = Arc::new(VerdictResolver::new(Arc::new(MemoryStore::new()), Arc::new(gateway)));
//! let surface = RecordingSurface::new();
//! let watcher = NavigationWatcher::new(resolver.clone(), Arc::new(surface.clone()));
//!
//! // Not cached yet: the watcher shows nothing and never fetches
//! watcher.on_navigation_complete(ContextId(1), "https://b.com/").await;
//! assert_eq!(surface.badge_text(Some(ContextId(1))).as_deref(), Some(""));
//!
//! // Opening the popup classifies and caches the domain
//! let popup = PopupController::new(resolver, SurfaceNotifier::new(4, 1));
//! popup.open(&DomainName::new("b.com").unwrap()).await;
//!
//! // The next navigation finds it
//! watcher.on_navigation_complete(ContextId(1), "https://b.com/").await;
//! assert_eq!(surface.badge_text(Some(ContextId(1))).as_deref(), Some("!"));
//! assert_eq!(surface.popup_opens(), 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod badge_listener;
pub mod banner;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notifier;
pub mod popup;
pub mod resolver;
pub mod surface;
pub mod sweeper;
pub mod watcher;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-exports for convenience
pub use badge_listener::BadgeListener;
pub use banner::BannerView;
pub use config::{CachePolicy, SyncConfig};
pub use error::{NotifierError, ResolutionError};
pub use metrics::{MetricsSnapshot, SyncMetrics};
pub use notifier::{Delivery, Subscription, SurfaceMessage, SurfaceNotifier};
pub use popup::{PopupController, PopupView, VerdictView};
pub use resolver::VerdictResolver;
pub use surface::{Badge, BadgeSurface, ContextId, RecordingSurface, SurfaceCall};
pub use sweeper::Sweeper;
pub use watcher::{BadgeState, LoadStatus, NavigationEvent, NavigationOutcome, NavigationWatcher};

/// Current time in seconds since the Unix epoch
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
