//! In-page warning banner
//!
//! Injected into every page; it reads the cached verdict for the page's
//! domain and shows a warning only for unsafe domains. It never triggers a
//! classification.

use crate::resolver::VerdictResolver;
use serde::Serialize;
use vigil_domain::{Alternative, DomainName, VerdictRecord};

/// Banner heading
pub const BANNER_WARNING: &str = "Warning: This site may not be safe!";

/// Lead-in for the alternatives list
pub const BANNER_ALTERNATIVES: &str = "Consider alternatives:";

/// A banner to prepend to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerView {
    /// Domain the warning is for
    pub domain: DomainName,
    /// Links to suggested replacements, in order
    pub alternatives: Vec<Alternative>,
}

impl BannerView {
    /// Banner for a record; `None` unless the verdict is unsafe
    pub fn for_record(record: &VerdictRecord) -> Option<Self> {
        if record.is_safe() {
            return None;
        }
        Some(Self {
            domain: record.domain.clone(),
            alternatives: record.alternatives.clone(),
        })
    }

    /// Banner for a page, from the cache only
    ///
    /// Unparseable and non-http(s) URLs get no banner.
    pub async fn for_page(resolver: &VerdictResolver, url: &str) -> Option<Self> {
        let domain = match DomainName::from_url(url) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::debug!(error = %e, "no banner for page");
                return None;
            }
        };
        let record = resolver.lookup(&domain).await?;
        Self::for_record(&record)
    }

    /// Text lines as shown: heading, lead-in, then one `name <url>` per alternative
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("⚠️ {}", BANNER_WARNING),
            BANNER_ALTERNATIVES.to_string(),
        ];
        lines.extend(
            self.alternatives
                .iter()
                .map(|alt| format!("{} <{}>", alt.name, alt.url)),
        );
        lines
    }
}
