//! Popup view model
//!
//! The popup is the one surface that populates the cache: opening it for
//! an uncached domain resolves through the gateway. Whatever happens, it
//! ends up with something to show, either a verdict view or a failure
//! notice.

use crate::error::ResolutionError;
use crate::notifier::{Delivery, SurfaceMessage, SurfaceNotifier};
use crate::resolver::VerdictResolver;
use crate::surface::{SAFE_COLOR, UNSAFE_COLOR};
use serde::Serialize;
use std::sync::Arc;
use vigil_domain::classification::{findings_from_raw, privacy_policy_from_raw};
use vigil_domain::{Alternative, DomainName, UrlError, VerdictRecord};

/// Summary shown for safe verdicts
pub const SAFE_SUMMARY: &str = "Privacy policy analysis indicates this site is safe to use.";

/// Summary shown for unsafe verdicts the service did not explain
pub const GENERIC_UNSAFE_SUMMARY: &str =
    "This site was flagged as unsafe, but no analysis details were provided.";

/// Detail shown when an unsafe finding has no explanation
pub const NO_DETAILS: &str = "No additional details available.";

/// Colour band for a trust score
pub fn score_color(score: u8) -> &'static str {
    match score {
        8.. => "#2ecc71",
        6..=7 => "#27ae60",
        4..=5 => "#f39c12",
        2..=3 => "#e67e22",
        _ => "#e74c3c",
    }
}

/// Everything the popup shows for a known verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictView {
    /// Domain the verdict is for
    pub domain: DomainName,
    /// Trust score, 0 to 10
    pub trust_score: u8,
    /// Colour of the score bar
    pub score_color: &'static str,
    /// Pill text (`Safe` or `Unsafe`)
    pub pill: &'static str,
    /// Pill colour
    pub pill_color: &'static str,
    /// Heading
    pub headline: &'static str,
    /// One-line summary
    pub summary: String,
    /// Expanded explanation (unsafe verdicts only)
    pub detail: Option<String>,
    /// Link to the domain's privacy policy (safe verdicts only)
    pub privacy_policy: Option<String>,
    /// Suggested replacements
    pub alternatives: Vec<Alternative>,
}

impl VerdictView {
    /// Build the view for a record
    ///
    /// Reads analysis text from the retained payload. A payload without
    /// (or with unreadable) analysis falls back to generic text.
    pub fn from_record(record: &VerdictRecord) -> Self {
        let trust_score = record.trust_score.value();

        if record.is_safe() {
            return Self {
                domain: record.domain.clone(),
                trust_score,
                score_color: score_color(trust_score),
                pill: "Safe",
                pill_color: SAFE_COLOR,
                headline: "Website is Safe",
                summary: SAFE_SUMMARY.to_string(),
                detail: None,
                privacy_policy: privacy_policy_from_raw(&record.raw),
                alternatives: Vec::new(),
            };
        }

        let (summary, detail) = match findings_from_raw(&record.raw).into_iter().next() {
            Some(finding) => (
                finding.headline,
                finding.detail.unwrap_or_else(|| NO_DETAILS.to_string()),
            ),
            None => (GENERIC_UNSAFE_SUMMARY.to_string(), NO_DETAILS.to_string()),
        };

        Self {
            domain: record.domain.clone(),
            trust_score,
            score_color: score_color(trust_score),
            pill: "Unsafe",
            pill_color: UNSAFE_COLOR,
            headline: "Privacy Concerns Detected",
            summary,
            detail: Some(detail),
            privacy_policy: None,
            alternatives: record.alternatives.clone(),
        }
    }
}

/// What the popup renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopupView {
    /// A verdict is known
    Verdict(VerdictView),
    /// Resolution failed; nothing was cached
    Failed {
        /// `Warning` for rejections, `Error` for unreachable
        title: &'static str,
        /// Message for the user
        message: String,
    },
}

impl PopupView {
    /// Failure notice for a resolution error
    pub fn failed(error: &ResolutionError) -> Self {
        let title = match error {
            ResolutionError::GatewayRejected(_) => "Warning",
            ResolutionError::GatewayUnreachable(_) => "Error",
        };
        PopupView::Failed {
            title,
            message: error.user_message().to_string(),
        }
    }

    /// The verdict view, if any
    pub fn verdict(&self) -> Option<&VerdictView> {
        match self {
            PopupView::Verdict(view) => Some(view),
            PopupView::Failed { .. } => None,
        }
    }
}

/// Opens the popup for a domain
pub struct PopupController {
    resolver: Arc<VerdictResolver>,
    notifier: SurfaceNotifier,
}

impl PopupController {
    /// Create a controller
    pub fn new(resolver: Arc<VerdictResolver>, notifier: SurfaceNotifier) -> Self {
        Self { resolver, notifier }
    }

    /// Resolve the domain (cache first) and build the view
    ///
    /// On success the badge is told to repaint, whether the verdict came
    /// from the cache or the gateway.
    pub async fn open(&self, domain: &DomainName) -> PopupView {
        match self.resolver.resolve(domain).await {
            Ok(record) => {
                let delivery = self.notifier.notify(SurfaceMessage::update_icon(&record));
                if delivery == Delivery::NoListeners {
                    tracing::debug!(domain = %domain, "no badge listener for popup update");
                }
                PopupView::Verdict(VerdictView::from_record(&record))
            }
            Err(e) => PopupView::failed(&e),
        }
    }

    /// Open the popup for a page URL
    pub async fn open_url(&self, url: &str) -> Result<PopupView, UrlError> {
        let domain = DomainName::from_url(url)?;
        Ok(self.open(&domain).await)
    }
}
