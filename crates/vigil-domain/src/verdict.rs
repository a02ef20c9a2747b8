//! Verdict module - the cached unit of truth for one domain

use crate::DomainName;
use serde::{Deserialize, Serialize};

/// Classification outcome that may be persisted
///
/// There is deliberately no "unknown" variant: an unknown domain is
/// represented by the absence of a record, never by a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Domain is trusted
    Safe,
    /// Domain raised concerns
    Unsafe,
}

impl Verdict {
    /// Build from the service's boolean flag
    pub fn from_is_safe(is_safe: bool) -> Self {
        if is_safe {
            Verdict::Safe
        } else {
            Verdict::Unsafe
        }
    }

    /// Whether this verdict is `Safe`
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }

    /// Storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Unsafe => "unsafe",
        }
    }

    /// Parse a storage label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "safe" => Some(Verdict::Safe),
            "unsafe" => Some(Verdict::Unsafe),
            _ => None,
        }
    }
}

/// Tri-state answer to "is this domain trusted?"
///
/// `Unknown` is what a cache miss looks like to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Safety {
    /// No verdict is cached
    #[default]
    Unknown,
    /// Cached as safe
    Safe,
    /// Cached as unsafe
    Unsafe,
}

impl From<Verdict> for Safety {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Safe => Safety::Safe,
            Verdict::Unsafe => Safety::Unsafe,
        }
    }
}

impl From<Option<&VerdictRecord>> for Safety {
    fn from(record: Option<&VerdictRecord>) -> Self {
        record.map(|r| r.verdict.into()).unwrap_or(Safety::Unknown)
    }
}

/// Trust score on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct TrustScore(u8);

impl TrustScore {
    /// Highest possible score
    pub const MAX: u8 = 10;

    /// Clamp any integer into 0..=10
    ///
    /// The service reports `-1` when scoring failed; that lands on 0.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    /// Raw score value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<i64> for TrustScore {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<TrustScore> for u8 {
    fn from(score: TrustScore) -> Self {
        score.0
    }
}

/// Suggested replacement for an unsafe domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Display name (usually the alternative's domain)
    pub name: String,

    /// Link to the alternative
    pub url: String,

    /// Why this alternative was suggested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Alternative's privacy policy, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<String>,

    /// Alternative's terms and conditions, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_and_conditions: Option<String>,
}

impl Alternative {
    /// Create an alternative with just a name and link
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            explanation: None,
            privacy_policy: None,
            terms_and_conditions: None,
        }
    }
}

/// Cached verdict for one domain
///
/// Records are written whole and never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    /// Cache key
    pub domain: DomainName,

    /// Safe or unsafe
    pub verdict: Verdict,

    /// 0-10 trust score
    pub trust_score: TrustScore,

    /// Ordered replacement suggestions (always empty for safe verdicts)
    #[serde(default)]
    pub alternatives: Vec<Alternative>,

    /// Opaque classification payload, kept verbatim
    #[serde(default)]
    pub raw: String,

    /// When the classification completed (seconds since Unix epoch)
    pub classified_at: u64,
}

impl VerdictRecord {
    /// Create a record, enforcing that safe verdicts carry no alternatives
    pub fn new(
        domain: DomainName,
        verdict: Verdict,
        trust_score: TrustScore,
        alternatives: Vec<Alternative>,
        raw: impl Into<String>,
        classified_at: u64,
    ) -> Self {
        let alternatives = match verdict {
            Verdict::Safe => Vec::new(),
            Verdict::Unsafe => alternatives,
        };

        Self {
            domain,
            verdict,
            trust_score,
            alternatives,
            raw: raw.into(),
            classified_at,
        }
    }

    /// Whether the verdict is `Safe`
    pub fn is_safe(&self) -> bool {
        self.verdict.is_safe()
    }

    /// Age in seconds relative to `now`
    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.classified_at)
    }
}
