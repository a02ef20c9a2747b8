//! Badge surface abstraction
//!
//! The badge is the small text + colour indicator on the extension's action
//! icon, set per browsing context or globally. The core only ever paints one
//! of three badges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use vigil_domain::Safety;

/// Badge text for a trusted domain
pub const SAFE_TEXT: &str = "✓";

/// Badge text for an untrusted domain
pub const UNSAFE_TEXT: &str = "!";

/// Badge colour for a trusted domain
pub const SAFE_COLOR: &str = "#2ecc71";

/// Badge colour for an untrusted domain
pub const UNSAFE_COLOR: &str = "#e74c3c";

/// Browsing context (tab) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three badges the core paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    /// Green check
    Safe,
    /// Red exclamation mark
    Unsafe,
    /// Empty text (no verdict known)
    Cleared,
}

impl Badge {
    /// Badge for a lookup outcome
    pub fn from_safety(safety: Safety) -> Self {
        match safety {
            Safety::Safe => Badge::Safe,
            Safety::Unsafe => Badge::Unsafe,
            Safety::Unknown => Badge::Cleared,
        }
    }

    /// Badge for a boolean verdict flag
    pub fn from_is_safe(is_safe: bool) -> Self {
        if is_safe {
            Badge::Safe
        } else {
            Badge::Unsafe
        }
    }

    /// Badge text
    pub fn text(&self) -> &'static str {
        match self {
            Badge::Safe => SAFE_TEXT,
            Badge::Unsafe => UNSAFE_TEXT,
            Badge::Cleared => "",
        }
    }

    /// Badge colour; a cleared badge keeps whatever colour it had
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Badge::Safe => Some(SAFE_COLOR),
            Badge::Unsafe => Some(UNSAFE_COLOR),
            Badge::Cleared => None,
        }
    }
}

/// The extension action surface
///
/// Calls are fire-and-forget, like the browser APIs they stand for. `None`
/// as the context targets the global (all-tabs) badge.
pub trait BadgeSurface: Send + Sync {
    /// Reset the action icon
    fn set_icon(&self, context: Option<ContextId>);

    /// Set the badge text
    fn set_badge_text(&self, context: Option<ContextId>, text: &str);

    /// Set the badge background colour
    fn set_badge_color(&self, context: Option<ContextId>, color: &str);

    /// Surface the detail popup
    fn open_popup(&self);
}

/// Paint a badge: icon, text, then colour (if the badge has one)
pub fn paint(surface: &dyn BadgeSurface, context: Option<ContextId>, badge: Badge) {
    surface.set_icon(context);
    surface.set_badge_text(context, badge.text());
    if let Some(color) = badge.color() {
        surface.set_badge_color(context, color);
    }
}

/// One call made against a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `set_icon`
    SetIcon(Option<ContextId>),
    /// `set_badge_text`
    SetBadgeText(Option<ContextId>, String),
    /// `set_badge_color`
    SetBadgeColor(Option<ContextId>, String),
    /// `open_popup`
    OpenPopup,
}

/// Surface that records every call, for tests and dry runs
///
/// Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    /// Create an empty recording surface
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<SurfaceCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.log().clone()
    }

    /// Most recent badge text set for a context
    pub fn badge_text(&self, context: Option<ContextId>) -> Option<String> {
        self.log().iter().rev().find_map(|call| match call {
            SurfaceCall::SetBadgeText(c, text) if *c == context => Some(text.clone()),
            _ => None,
        })
    }

    /// Most recent badge colour set for a context
    pub fn badge_color(&self, context: Option<ContextId>) -> Option<String> {
        self.log().iter().rev().find_map(|call| match call {
            SurfaceCall::SetBadgeColor(c, color) if *c == context => Some(color.clone()),
            _ => None,
        })
    }

    /// How many times the popup was opened
    pub fn popup_opens(&self) -> usize {
        self.log()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::OpenPopup))
            .count()
    }

    /// Forget all recorded calls
    pub fn clear(&self) {
        self.log().clear();
    }
}

impl BadgeSurface for RecordingSurface {
    fn set_icon(&self, context: Option<ContextId>) {
        self.log().push(SurfaceCall::SetIcon(context));
    }

    fn set_badge_text(&self, context: Option<ContextId>, text: &str) {
        self.log().push(SurfaceCall::SetBadgeText(context, text.to_string()));
    }

    fn set_badge_color(&self, context: Option<ContextId>, color: &str) {
        self.log().push(SurfaceCall::SetBadgeColor(context, color.to_string()));
    }

    fn open_popup(&self) {
        self.log().push(SurfaceCall::OpenPopup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_appearance() {
        assert_eq!(Badge::Safe.text(), "✓");
        assert_eq!(Badge::Safe.color(), Some("#2ecc71"));
        assert_eq!(Badge::Unsafe.text(), "!");
        assert_eq!(Badge::Unsafe.color(), Some("#e74c3c"));
        assert_eq!(Badge::Cleared.text(), "");
        assert_eq!(Badge::Cleared.color(), None);
    }

    #[test]
    fn test_badge_from_safety() {
        assert_eq!(Badge::from_safety(Safety::Safe), Badge::Safe);
        assert_eq!(Badge::from_safety(Safety::Unsafe), Badge::Unsafe);
        assert_eq!(Badge::from_safety(Safety::Unknown), Badge::Cleared);
    }

    #[test]
    fn test_paint_order() {
        let surface = RecordingSurface::new();
        let ctx = Some(ContextId(3));
        paint(&surface, ctx, Badge::Unsafe);

        assert_eq!(
            surface.calls(),
            vec![
                SurfaceCall::SetIcon(ctx),
                SurfaceCall::SetBadgeText(ctx, "!".to_string()),
                SurfaceCall::SetBadgeColor(ctx, "#e74c3c".to_string()),
            ]
        );
    }

    #[test]
    fn test_paint_cleared_skips_color() {
        let surface = RecordingSurface::new();
        paint(&surface, None, Badge::Cleared);

        assert_eq!(surface.badge_text(None).as_deref(), Some(""));
        assert_eq!(surface.badge_color(None), None);
    }

    #[test]
    fn test_recording_is_per_context() {
        let surface = RecordingSurface::new();
        paint(&surface, Some(ContextId(1)), Badge::Safe);
        paint(&surface, Some(ContextId(2)), Badge::Unsafe);

        assert_eq!(surface.badge_text(Some(ContextId(1))).as_deref(), Some("✓"));
        assert_eq!(surface.badge_text(Some(ContextId(2))).as_deref(), Some("!"));
        assert_eq!(surface.badge_text(None), None);
        assert_eq!(surface.popup_opens(), 0);
    }
}
