//! Badge repaint listener
//!
//! Consumes `UPDATE_ICON` notifications and repaints the badge. By default
//! it paints the global badge (no context), which is what the background
//! page does when the popup reports a fresh verdict.

use crate::notifier::{SurfaceMessage, Subscription};
use crate::surface::{paint, Badge, BadgeSurface, ContextId};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Repaints a badge for every notification it receives
pub struct BadgeListener {
    surface: Arc<dyn BadgeSurface>,
    context: Option<ContextId>,
}

impl BadgeListener {
    /// Listener that paints the global badge
    pub fn global(surface: Arc<dyn BadgeSurface>) -> Self {
        Self {
            surface,
            context: None,
        }
    }

    /// Listener scoped to one context
    pub fn scoped(surface: Arc<dyn BadgeSurface>, context: ContextId) -> Self {
        Self {
            surface,
            context: Some(context),
        }
    }

    /// Repaint for one message
    pub fn apply(&self, message: &SurfaceMessage) -> Badge {
        let badge = match message {
            SurfaceMessage::UpdateIcon { is_safe, .. } => Badge::from_is_safe(*is_safe),
        };
        paint(self.surface.as_ref(), self.context, badge);
        badge
    }

    /// Repaint until the notifier goes away; returns the number of repaints
    pub async fn run(self, mut subscription: Subscription) -> usize {
        let mut repaints = 0;
        while let Some(message) = subscription.recv().await {
            let badge = self.apply(&message);
            tracing::debug!(subscription = subscription.id(), badge = badge.text(), "badge repainted");
            repaints += 1;
        }
        repaints
    }

    /// Run on a background task
    pub fn spawn(self, subscription: Subscription) -> JoinHandle<usize> {
        tokio::spawn(self.run(subscription))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::SurfaceNotifier;
    use crate::surface::{RecordingSurface, SurfaceCall};

    #[test]
    fn test_apply_paints_global_badge() {
        let surface = RecordingSurface::new();
        let listener = BadgeListener::global(Arc::new(surface.clone()));

        let badge = listener.apply(&SurfaceMessage::UpdateIcon {
            is_safe: false,
            trust_score: 1,
        });
        assert_eq!(badge, Badge::Unsafe);
        assert_eq!(surface.badge_text(None).as_deref(), Some("!"));
        assert_eq!(surface.badge_color(None).as_deref(), Some("#e74c3c"));
        assert_eq!(surface.calls()[0], SurfaceCall::SetIcon(None));
    }

    #[test]
    fn test_scoped_listener() {
        let surface = RecordingSurface::new();
        let listener = BadgeListener::scoped(Arc::new(surface.clone()), ContextId(5));

        listener.apply(&SurfaceMessage::UpdateIcon {
            is_safe: true,
            trust_score: 9,
        });
        assert_eq!(surface.badge_text(Some(ContextId(5))).as_deref(), Some("✓"));
        assert_eq!(surface.badge_text(None), None);
    }

    #[tokio::test]
    async fn test_run_until_notifier_dropped() {
        let surface = RecordingSurface::new();
        let notifier = SurfaceNotifier::new(2, 4);
        let subscription = notifier.subscribe().unwrap();
        let handle = BadgeListener::global(Arc::new(surface.clone())).spawn(subscription);

        notifier.notify(SurfaceMessage::UpdateIcon {
            is_safe: true,
            trust_score: 8,
        });
        notifier.notify(SurfaceMessage::UpdateIcon {
            is_safe: false,
            trust_score: 2,
        });
        drop(notifier);

        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(surface.badge_text(None).as_deref(), Some("!"));
    }
}
