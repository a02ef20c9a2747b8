//! Navigation watcher
//!
//! Drives the per-context badge from navigation events. The watcher only
//! reads the cache; a miss leaves the context without a badge and never
//! triggers a classification. Populating the cache is the popup's job.
//!
//! Per context:
//!
//! ```text
//! no-badge --complete--> checking --hit(safe)----> safe
//!                                 --hit(unsafe)--> unsafe (+ popup)
//!                                 --miss---------> no-badge
//! ```
//!
//! Every lookup is tagged with a token from a monotonically increasing
//! counter. A newer navigation in the same context (or closing it) retires
//! the token, and a lookup that finishes with a retired token is thrown
//! away without touching the badge.

use crate::metrics::SyncMetrics;
use crate::resolver::VerdictResolver;
use crate::surface::{paint, Badge, BadgeSurface, ContextId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use vigil_domain::{DomainName, Safety};

/// Page load progress reported by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Navigation started, page still loading
    Loading,
    /// Page fully loaded
    Complete,
}

/// Browsing context lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// A context navigated or finished loading
    Updated {
        /// Context the event belongs to
        context: ContextId,
        /// URL as reported; may be anything
        url: String,
        /// Load progress
        status: LoadStatus,
    },
    /// A context was closed
    Closed {
        /// Context that went away
        context: ContextId,
    },
}

impl NavigationEvent {
    /// Page-load-complete event
    pub fn complete(context: ContextId, url: impl Into<String>) -> Self {
        NavigationEvent::Updated {
            context,
            url: url.into(),
            status: LoadStatus::Complete,
        }
    }

    /// Navigation-started event
    pub fn loading(context: ContextId, url: impl Into<String>) -> Self {
        NavigationEvent::Updated {
            context,
            url: url.into(),
            status: LoadStatus::Loading,
        }
    }

    /// Context the event belongs to
    pub fn context(&self) -> ContextId {
        match self {
            NavigationEvent::Updated { context, .. } | NavigationEvent::Closed { context } => {
                *context
            }
        }
    }
}

/// Badge state of one context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BadgeState {
    /// Nothing known
    #[default]
    NoBadge,
    /// Lookup in flight
    Checking {
        /// Domain being looked up
        domain: DomainName,
        /// Token of the lookup
        token: u64,
    },
    /// Trusted domain shown
    Safe {
        /// Domain the badge is for
        domain: DomainName,
    },
    /// Untrusted domain shown
    Unsafe {
        /// Domain the badge is for
        domain: DomainName,
    },
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Not an http(s) page; nothing changed
    Ignored,
    /// Navigation started; pending lookups for the context were retired
    Invalidated,
    /// Lookup finished and the badge was painted
    Applied(BadgeState),
    /// Lookup finished after the context moved on; result discarded
    Superseded,
    /// Context state dropped
    Closed,
}

/// Lookup claimed for a context but not yet finished
#[derive(Debug)]
struct PendingCheck {
    context: ContextId,
    domain: DomainName,
    token: u64,
}

#[derive(Debug, Default)]
struct ContextEntry {
    token: u64,
    checking: Option<DomainName>,
    painted: BadgeState,
}

impl ContextEntry {
    fn state(&self) -> BadgeState {
        match &self.checking {
            Some(domain) => BadgeState::Checking {
                domain: domain.clone(),
                token: self.token,
            },
            None => self.painted.clone(),
        }
    }
}

/// Per-context badge driver
pub struct NavigationWatcher {
    resolver: Arc<VerdictResolver>,
    surface: Arc<dyn BadgeSurface>,
    contexts: Mutex<HashMap<ContextId, ContextEntry>>,
    next_token: AtomicU64,
    auto_open_popup: bool,
}

impl NavigationWatcher {
    /// Create a watcher that opens the popup on unsafe pages
    pub fn new(resolver: Arc<VerdictResolver>, surface: Arc<dyn BadgeSurface>) -> Self {
        Self {
            resolver,
            surface,
            contexts: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            auto_open_popup: true,
        }
    }

    /// Enable or disable opening the popup for unsafe pages
    pub fn with_auto_open_popup(mut self, enabled: bool) -> Self {
        self.auto_open_popup = enabled;
        self
    }

    fn contexts(&self) -> MutexGuard<'_, HashMap<ContextId, ContextEntry>> {
        self.contexts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn metrics(&self) -> &SyncMetrics {
        self.resolver.metrics()
    }

    /// Current badge state of a context
    pub fn state(&self, context: ContextId) -> BadgeState {
        self.contexts()
            .get(&context)
            .map(ContextEntry::state)
            .unwrap_or_default()
    }

    /// Number of contexts with state
    pub fn tracked_contexts(&self) -> usize {
        self.contexts().len()
    }

    /// Dispatch one navigation event
    pub async fn handle(&self, event: NavigationEvent) -> NavigationOutcome {
        match event {
            NavigationEvent::Updated {
                context,
                url,
                status: LoadStatus::Complete,
            } => self.on_navigation_complete(context, &url).await,
            NavigationEvent::Updated {
                context,
                status: LoadStatus::Loading,
                ..
            } => self.on_navigation_started(context),
            NavigationEvent::Closed { context } => self.on_context_closed(context),
        }
    }

    /// A navigation began: retire any lookup still pending for the context
    ///
    /// The badge itself is left alone until the page completes.
    pub fn on_navigation_started(&self, context: ContextId) -> NavigationOutcome {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let mut contexts = self.contexts();
        let entry = contexts.entry(context).or_default();
        entry.token = token;
        entry.checking = None;
        tracing::trace!(context = %context, token, "navigation started");
        NavigationOutcome::Invalidated
    }

    /// The context went away; a pending lookup will be discarded
    pub fn on_context_closed(&self, context: ContextId) -> NavigationOutcome {
        self.contexts().remove(&context);
        tracing::debug!(context = %context, "context closed");
        NavigationOutcome::Closed
    }

    /// A page finished loading: look up its domain and paint the badge
    pub async fn on_navigation_complete(&self, context: ContextId, url: &str) -> NavigationOutcome {
        match self.start_check(context, url) {
            Some(check) => self.complete_check(check).await,
            None => NavigationOutcome::Ignored,
        }
    }

    /// Claim a token for the page's domain, or `None` for non-http(s) URLs
    ///
    /// Synchronous so that callers can order it against later events for
    /// the same context.
    fn start_check(&self, context: ContextId, url: &str) -> Option<PendingCheck> {
        let domain = match DomainName::from_url(url) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::debug!(context = %context, error = %e, "ignoring navigation");
                return None;
            }
        };

        let token = self.begin(context, &domain);
        Some(PendingCheck {
            context,
            domain,
            token,
        })
    }

    async fn complete_check(&self, check: PendingCheck) -> NavigationOutcome {
        let record = self.resolver.lookup(&check.domain).await;
        self.finish(check.context, check.token, check.domain, Safety::from(record.as_ref()))
    }

    fn begin(&self, context: ContextId, domain: &DomainName) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let mut contexts = self.contexts();
        let entry = contexts.entry(context).or_default();
        entry.token = token;
        entry.checking = Some(domain.clone());
        tracing::debug!(context = %context, domain = %domain, token, "checking domain");
        token
    }

    fn finish(
        &self,
        context: ContextId,
        token: u64,
        domain: DomainName,
        safety: Safety,
    ) -> NavigationOutcome {
        let mut contexts = self.contexts();

        let entry = match contexts.get_mut(&context) {
            Some(entry) if entry.token == token => entry,
            _ => {
                tracing::debug!(context = %context, domain = %domain, token, "discarding stale lookup");
                self.metrics().record_stale_discarded();
                return NavigationOutcome::Superseded;
            }
        };

        let state = match safety {
            Safety::Safe => BadgeState::Safe { domain },
            Safety::Unsafe => BadgeState::Unsafe { domain },
            Safety::Unknown => BadgeState::NoBadge,
        };

        // Painted while holding the lock so a newer navigation cannot
        // interleave between the token check and the surface calls.
        paint(self.surface.as_ref(), Some(context), Badge::from_safety(safety));
        if safety == Safety::Unsafe && self.auto_open_popup {
            tracing::info!(context = %context, "unsafe domain; opening popup");
            self.surface.open_popup();
        }

        entry.checking = None;
        entry.painted = state.clone();
        NavigationOutcome::Applied(state)
    }

    /// Process events until the channel closes
    ///
    /// Tokens are claimed in arrival order on this loop; only the store
    /// lookups run on their own tasks, so a slow lookup never delays later
    /// events and a later event always retires an earlier lookup.
    /// Returns the number of events handled.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<NavigationEvent>) -> usize {
        let mut tasks = JoinSet::new();
        let mut handled = 0;

        while let Some(event) = events.recv().await {
            handled += 1;
            match event {
                NavigationEvent::Updated {
                    context,
                    url,
                    status: LoadStatus::Complete,
                } => {
                    if let Some(check) = self.start_check(context, &url) {
                        let watcher = Arc::clone(&self);
                        tasks.spawn(async move { watcher.complete_check(check).await });
                    }
                }
                NavigationEvent::Updated {
                    context,
                    status: LoadStatus::Loading,
                    ..
                } => {
                    self.on_navigation_started(context);
                }
                NavigationEvent::Closed { context } => {
                    self.on_context_closed(context);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "navigation task failed");
            }
        }

        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceCall};
    use vigil_domain::traits::VerdictStore;
    use vigil_domain::{TrustScore, Verdict, VerdictRecord};
    use vigil_gateway::MockGateway;
    use vigil_store::MemoryStore;

    fn record(domain: &str, verdict: Verdict) -> VerdictRecord {
        VerdictRecord::new(
            DomainName::new(domain).unwrap(),
            verdict,
            TrustScore::clamped(7),
            vec![],
            "{}",
            0,
        )
    }

    async fn watcher_with(records: Vec<VerdictRecord>) -> (NavigationWatcher, RecordingSurface, MockGateway) {
        let store = MemoryStore::new();
        for r in records {
            store.put(r).await.unwrap();
        }
        let gateway = MockGateway::new();
        let resolver = Arc::new(VerdictResolver::new(Arc::new(store), Arc::new(gateway.clone())));
        let surface = RecordingSurface::new();
        let watcher = NavigationWatcher::new(resolver, Arc::new(surface.clone()));
        (watcher, surface, gateway)
    }

    #[tokio::test]
    async fn test_safe_hit_paints_green() {
        let (watcher, surface, _) = watcher_with(vec![record("a.com", Verdict::Safe)]).await;
        let ctx = ContextId(1);

        let outcome = watcher.on_navigation_complete(ctx, "https://a.com/x").await;
        assert_eq!(
            outcome,
            NavigationOutcome::Applied(BadgeState::Safe {
                domain: DomainName::new("a.com").unwrap()
            })
        );
        assert_eq!(surface.badge_text(Some(ctx)).as_deref(), Some("✓"));
        assert_eq!(surface.badge_color(Some(ctx)).as_deref(), Some("#2ecc71"));
        assert_eq!(surface.popup_opens(), 0);
    }

    #[tokio::test]
    async fn test_unsafe_hit_opens_popup() {
        let (watcher, surface, _) = watcher_with(vec![record("b.com", Verdict::Unsafe)]).await;

        watcher.on_navigation_complete(ContextId(2), "http://B.com/login").await;
        assert_eq!(surface.badge_text(Some(ContextId(2))).as_deref(), Some("!"));
        assert_eq!(surface.badge_color(Some(ContextId(2))).as_deref(), Some("#e74c3c"));
        assert_eq!(surface.popup_opens(), 1);
    }

    #[tokio::test]
    async fn test_auto_open_can_be_disabled() {
        let (watcher, surface, _) = watcher_with(vec![record("b.com", Verdict::Unsafe)]).await;
        let watcher = watcher.with_auto_open_popup(false);

        watcher.on_navigation_complete(ContextId(2), "https://b.com").await;
        assert_eq!(surface.badge_text(Some(ContextId(2))).as_deref(), Some("!"));
        assert_eq!(surface.popup_opens(), 0);
    }

    #[tokio::test]
    async fn test_miss_clears_badge_without_fetching() {
        let (watcher, surface, gateway) = watcher_with(vec![]).await;
        let ctx = ContextId(3);

        let outcome = watcher.on_navigation_complete(ctx, "https://new.com/").await;
        assert_eq!(outcome, NavigationOutcome::Applied(BadgeState::NoBadge));
        assert_eq!(surface.badge_text(Some(ctx)).as_deref(), Some(""));
        assert_eq!(surface.badge_color(Some(ctx)), None);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_http_ignored() {
        let (watcher, surface, _) = watcher_with(vec![]).await;

        for url in ["chrome://settings", "ftp://x", "not a url", "about:blank"] {
            let outcome = watcher.on_navigation_complete(ContextId(1), url).await;
            assert_eq!(outcome, NavigationOutcome::Ignored);
        }
        assert!(surface.calls().is_empty());
        assert_eq!(watcher.state(ContextId(1)), BadgeState::NoBadge);
        assert_eq!(watcher.tracked_contexts(), 0);
    }

    #[tokio::test]
    async fn test_loading_keeps_badge_and_retires_token() {
        let (watcher, surface, _) = watcher_with(vec![record("a.com", Verdict::Safe)]).await;
        let ctx = ContextId(1);

        watcher.on_navigation_complete(ctx, "https://a.com").await;
        surface.clear();

        let outcome = watcher.handle(NavigationEvent::loading(ctx, "https://b.com")).await;
        assert_eq!(outcome, NavigationOutcome::Invalidated);
        assert!(surface.calls().is_empty());
        assert!(matches!(watcher.state(ctx), BadgeState::Safe { .. }));
    }

    #[test]
    fn test_stale_finish_is_discarded() {
        let resolver = Arc::new(VerdictResolver::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockGateway::new()),
        ));
        let surface = RecordingSurface::new();
        let watcher = NavigationWatcher::new(resolver.clone(), Arc::new(surface.clone()));
        let ctx = ContextId(9);

        let x = DomainName::new("x.com").unwrap();
        let y = DomainName::new("y.com").unwrap();
        let stale = watcher.begin(ctx, &x);
        let current = watcher.begin(ctx, &y);
        assert!(current > stale);

        let outcome = watcher.finish(ctx, stale, x, Safety::Unsafe);
        assert_eq!(outcome, NavigationOutcome::Superseded);
        assert!(surface.calls().is_empty());
        assert_eq!(resolver.metrics().snapshot().stale_discarded, 1);
        assert!(matches!(watcher.state(ctx), BadgeState::Checking { token, .. } if token == current));

        let outcome = watcher.finish(ctx, current, y.clone(), Safety::Safe);
        assert_eq!(outcome, NavigationOutcome::Applied(BadgeState::Safe { domain: y }));
    }

    #[test]
    fn test_closed_context_discards_pending() {
        let resolver = Arc::new(VerdictResolver::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockGateway::new()),
        ));
        let surface = RecordingSurface::new();
        let watcher = NavigationWatcher::new(resolver, Arc::new(surface.clone()));
        let ctx = ContextId(4);
        let domain = DomainName::new("a.com").unwrap();

        let token = watcher.begin(ctx, &domain);
        assert_eq!(watcher.on_context_closed(ctx), NavigationOutcome::Closed);
        assert_eq!(watcher.finish(ctx, token, domain, Safety::Safe), NavigationOutcome::Superseded);
        assert!(surface.calls().is_empty());
        assert_eq!(watcher.tracked_contexts(), 0);
    }

    #[tokio::test]
    async fn test_claimed_check_is_retired_by_later_events() {
        let (watcher, surface, _) = watcher_with(vec![record("b.com", Verdict::Unsafe)]).await;
        let ctx = ContextId(5);

        assert!(watcher.start_check(ctx, "chrome://newtab").is_none());

        let check = watcher.start_check(ctx, "https://b.com/").unwrap();
        watcher.on_navigation_started(ctx);
        assert_eq!(watcher.complete_check(check).await, NavigationOutcome::Superseded);

        let check = watcher.start_check(ctx, "https://b.com/").unwrap();
        watcher.on_context_closed(ctx);
        assert_eq!(watcher.complete_check(check).await, NavigationOutcome::Superseded);

        assert!(surface.calls().is_empty());
        assert_eq!(surface.popup_opens(), 0);
        assert_eq!(watcher.tracked_contexts(), 0);
    }

    #[tokio::test]
    async fn test_run_processes_channel() {
        let (watcher, surface, _) = watcher_with(vec![
            record("a.com", Verdict::Safe),
            record("b.com", Verdict::Unsafe),
        ])
        .await;
        let watcher = Arc::new(watcher);

        let (tx, rx) = mpsc::channel(8);
        tx.send(NavigationEvent::complete(ContextId(1), "https://a.com")).await.unwrap();
        tx.send(NavigationEvent::complete(ContextId(2), "https://b.com")).await.unwrap();
        tx.send(NavigationEvent::Closed { context: ContextId(3) }).await.unwrap();
        drop(tx);

        let handled = watcher.clone().run(rx).await;
        assert_eq!(handled, 3);
        assert_eq!(surface.badge_text(Some(ContextId(1))).as_deref(), Some("✓"));
        assert_eq!(surface.badge_text(Some(ContextId(2))).as_deref(), Some("!"));
        assert!(surface.calls().contains(&SurfaceCall::OpenPopup));
    }
}
