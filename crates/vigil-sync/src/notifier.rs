//! Surface notifier
//!
//! Best-effort publish/subscribe channel that lets whichever component just
//! computed a verdict tell the badge logic to repaint. Delivery is
//! at-most-once: nothing is persisted, nothing is retried, and a message
//! sent while nobody listens is gone. Unlike a blind broadcast, the
//! subscriber set is bounded and enumerated, so "no one was listening" is a
//! reported outcome.
//!
//! Messages carry no domain. A subscriber is expected to be scoped to the
//! surface it repaints already, so the notifier only buys responsiveness,
//! never correctness.

use crate::config::SyncConfig;
use crate::error::NotifierError;
use crate::metrics::SyncMetrics;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use vigil_domain::VerdictRecord;

/// Cross-component message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceMessage {
    /// A verdict is now known; repaint the badge
    #[serde(rename = "UPDATE_ICON", rename_all = "camelCase")]
    UpdateIcon {
        /// Verdict flag
        is_safe: bool,
        /// Trust score, 0 to 10
        trust_score: u8,
    },
}

impl SurfaceMessage {
    /// Repaint message for a freshly resolved record
    pub fn update_icon(record: &VerdictRecord) -> Self {
        SurfaceMessage::UpdateIcon {
            is_safe: record.is_safe(),
            trust_score: record.trust_score.value(),
        }
    }
}

/// What happened to one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Nobody was subscribed; the message was discarded
    NoListeners,
    /// Fan-out result over the live subscribers
    Sent {
        /// Subscribers whose queue accepted the message
        delivered: usize,
        /// Subscribers that were full or had gone away
        dropped: usize,
    },
}

impl Delivery {
    /// Whether at least one subscriber got the message
    pub fn reached_anyone(&self) -> bool {
        matches!(self, Delivery::Sent { delivered, .. } if *delivered > 0)
    }
}

struct Slot {
    id: u64,
    tx: mpsc::Sender<SurfaceMessage>,
}

struct Registry {
    slots: Mutex<Vec<Slot>>,
    next_id: AtomicU64,
}

impl Registry {
    fn slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, id: u64) {
        self.slots().retain(|slot| slot.id != id);
    }
}

/// Bounded publish/subscribe notifier
///
/// Clones share the same subscriber set.
///
/// # Examples
///
/// ```
/// use vigil_sync::{Delivery, SurfaceMessage, SurfaceNotifier};
///
/// let notifier = SurfaceNotifier::new(4, 1);
/// let message = SurfaceMessage::UpdateIcon { is_safe: true, trust_score: 9 };
///
/// assert_eq!(notifier.notify(message), Delivery::NoListeners);
///
/// let mut subscription = notifier.subscribe().unwrap();
/// assert_eq!(notifier.notify(message), Delivery::Sent { delivered: 1, dropped: 0 });
/// assert_eq!(subscription.try_recv(), Some(message));
/// ```
#[derive(Clone)]
pub struct SurfaceNotifier {
    registry: Arc<Registry>,
    max_subscribers: usize,
    buffer: usize,
    metrics: Option<Arc<SyncMetrics>>,
}

impl SurfaceNotifier {
    /// Create a notifier; `buffer` is the per-subscriber queue depth
    pub fn new(max_subscribers: usize, buffer: usize) -> Self {
        Self {
            registry: Arc::new(Registry {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
            max_subscribers,
            buffer: buffer.max(1),
            metrics: None,
        }
    }

    /// Create a notifier with the configured bounds
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_subscribers, config.subscriber_buffer)
    }

    /// Count deliveries and drops in shared metrics
    pub fn with_metrics(mut self, metrics: Arc<SyncMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Register a new listener
    ///
    /// Subscriptions whose receiver was dropped free their slot first.
    pub fn subscribe(&self) -> Result<Subscription, NotifierError> {
        let mut slots = self.registry.slots();
        slots.retain(|slot| !slot.tx.is_closed());

        if slots.len() >= self.max_subscribers {
            tracing::warn!(limit = self.max_subscribers, "notifier subscriber limit reached");
            return Err(NotifierError::SubscriberLimit(self.max_subscribers));
        }

        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer);
        slots.push(Slot { id, tx });
        tracing::debug!(subscription = id, live = slots.len(), "notifier subscription opened");

        Ok(Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        })
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .slots()
            .iter()
            .filter(|slot| !slot.tx.is_closed())
            .count()
    }

    /// Fire-and-forget a message to every live subscriber
    ///
    /// Never blocks. A subscriber whose queue is full misses this message;
    /// one that has gone away is unregistered.
    pub fn notify(&self, message: SurfaceMessage) -> Delivery {
        let mut slots = self.registry.slots();

        if slots.is_empty() {
            tracing::debug!(?message, "no notifier listeners; message dropped");
            self.count(0, 1);
            return Delivery::NoListeners;
        }

        let mut delivered = 0;
        let mut dropped = 0;
        slots.retain(|slot| match slot.tx.try_send(message) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(subscription = slot.id, "subscriber queue full; message dropped");
                dropped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => {
                dropped += 1;
                false
            }
        });

        self.count(delivered, dropped);

        if delivered == 0 && slots.is_empty() {
            return Delivery::NoListeners;
        }

        Delivery::Sent { delivered, dropped }
    }

    fn count(&self, delivered: usize, dropped: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_notification(delivered, dropped);
        }
    }
}

/// One registered listener
///
/// Dropping it frees its slot in the notifier.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<SurfaceMessage>,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Subscription identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next message; `None` once every notifier handle is gone
    pub async fn recv(&mut self) -> Option<SurfaceMessage> {
        self.rx.recv().await
    }

    /// Take a queued message without waiting
    pub fn try_recv(&mut self) -> Option<SurfaceMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::{DomainName, TrustScore, Verdict};

    const SAFE: SurfaceMessage = SurfaceMessage::UpdateIcon {
        is_safe: true,
        trust_score: 9,
    };

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(SAFE).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "UPDATE_ICON", "isSafe": true, "trustScore": 9})
        );

        let parsed: SurfaceMessage =
            serde_json::from_str(r#"{"type":"UPDATE_ICON","isSafe":false,"trustScore":2}"#).unwrap();
        assert_eq!(
            parsed,
            SurfaceMessage::UpdateIcon {
                is_safe: false,
                trust_score: 2
            }
        );
    }

    #[test]
    fn test_update_icon_from_record() {
        let record = VerdictRecord::new(
            DomainName::new("b.com").unwrap(),
            Verdict::Unsafe,
            TrustScore::clamped(3),
            vec![],
            "{}",
            0,
        );
        assert_eq!(
            SurfaceMessage::update_icon(&record),
            SurfaceMessage::UpdateIcon {
                is_safe: false,
                trust_score: 3
            }
        );
    }

    #[test]
    fn test_no_listeners_is_visible() {
        let metrics = Arc::new(SyncMetrics::new());
        let notifier = SurfaceNotifier::new(2, 1).with_metrics(metrics.clone());

        assert_eq!(notifier.notify(SAFE), Delivery::NoListeners);
        assert!(!notifier.notify(SAFE).reached_anyone());
        assert_eq!(metrics.snapshot().notifications_dropped, 2);
    }

    #[test]
    fn test_fan_out() {
        let notifier = SurfaceNotifier::new(4, 2);
        let mut a = notifier.subscribe().unwrap();
        let mut b = notifier.subscribe().unwrap();

        assert_eq!(
            notifier.notify(SAFE),
            Delivery::Sent {
                delivered: 2,
                dropped: 0
            }
        );
        assert_eq!(a.try_recv(), Some(SAFE));
        assert_eq!(b.try_recv(), Some(SAFE));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_subscriber_limit() {
        let notifier = SurfaceNotifier::new(1, 1);
        let first = notifier.subscribe().unwrap();
        assert_eq!(
            notifier.subscribe().err(),
            Some(NotifierError::SubscriberLimit(1))
        );

        drop(first);
        assert_eq!(notifier.subscriber_count(), 0);
        assert!(notifier.subscribe().is_ok());
    }

    #[test]
    fn test_full_queue_drops_for_that_subscriber_only() {
        let notifier = SurfaceNotifier::new(4, 1);
        let mut slow = notifier.subscribe().unwrap();

        notifier.notify(SAFE);
        assert_eq!(
            notifier.notify(SAFE),
            Delivery::Sent {
                delivered: 0,
                dropped: 1
            }
        );

        assert_eq!(slow.try_recv(), Some(SAFE));
        assert_eq!(slow.try_recv(), None);
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_dropped_subscription_unregisters() {
        let notifier = SurfaceNotifier::new(4, 1);
        let subscription = notifier.subscribe().unwrap();
        assert_eq!(notifier.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(notifier.notify(SAFE), Delivery::NoListeners);
    }

    #[tokio::test]
    async fn test_recv_across_tasks() {
        let notifier = SurfaceNotifier::new(4, 4);
        let mut subscription = notifier.subscribe().unwrap();

        let sender = notifier.clone();
        tokio::spawn(async move {
            sender.notify(SAFE);
        })
        .await
        .unwrap();

        assert_eq!(subscription.recv().await, Some(SAFE));
    }
}
