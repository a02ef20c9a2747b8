//! Configuration for the synchronization core
//!
//! Defines the cache expiry policy, sweep cadence and notifier bounds.
//!
//! Cached verdicts never expire unless a TTL is configured. That default is
//! a choice, not an accident: a verdict holds for the lifetime of the store
//! (the browser session, or the database file) and a domain is only
//! reclassified after an explicit eviction. Set `cache_ttl_secs` to make
//! verdicts go stale.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vigil_domain::VerdictRecord;

/// Configuration for the synchronization core
///
/// # Examples
///
/// ```
/// use vigil_sync::SyncConfig;
///
/// // Default: verdicts cached indefinitely
/// let config = SyncConfig::default();
/// assert_eq!(config.cache_ttl_secs, None);
///
/// // Verdicts expire after a day
/// let config = SyncConfig::expiring(24);
/// assert_eq!(config.cache_ttl_secs, Some(24 * 3600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Verdict lifetime in seconds; `None` keeps verdicts indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,

    /// How often the sweeper purges expired verdicts (in minutes)
    /// Default: 60
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,

    /// Upper bound on live notifier subscriptions
    /// Default: 8
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,

    /// Per-subscriber queue depth; notifications beyond it are dropped
    /// Default: 4
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,

    /// Open the popup when a navigation lands on an unsafe domain
    /// Default: true
    #[serde(default = "default_auto_open_popup")]
    pub auto_open_popup: bool,
}

fn default_sweep_interval_minutes() -> u64 {
    60
}

fn default_max_subscribers() -> usize {
    8
}

fn default_subscriber_buffer() -> usize {
    4
}

fn default_auto_open_popup() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: None,
            sweep_interval_minutes: default_sweep_interval_minutes(),
            max_subscribers: default_max_subscribers(),
            subscriber_buffer: default_subscriber_buffer(),
            auto_open_popup: default_auto_open_popup(),
        }
    }
}

impl SyncConfig {
    /// Verdicts expire after the given number of hours
    pub fn expiring(hours: u64) -> Self {
        Self {
            cache_ttl_secs: Some(hours.saturating_mul(3600)),
            ..Self::default()
        }
    }

    /// One-hour verdicts swept every ten minutes
    pub fn strict() -> Self {
        Self {
            cache_ttl_secs: Some(3600),
            sweep_interval_minutes: 10,
            ..Self::default()
        }
    }

    /// Cache policy derived from `cache_ttl_secs`
    pub fn cache_policy(&self) -> CachePolicy {
        match self.cache_ttl_secs {
            Some(secs) => CachePolicy::with_ttl(Duration::from_secs(secs)),
            None => CachePolicy::indefinite(),
        }
    }

    /// Sweep interval as a Duration (never shorter than one minute)
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.max(1).saturating_mul(60))
    }
}

/// When a cached verdict stops counting as a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    ttl: Option<Duration>,
}

impl CachePolicy {
    /// Verdicts never expire
    pub fn indefinite() -> Self {
        Self { ttl: None }
    }

    /// Verdicts older than `ttl` are treated as absent
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }

    /// Configured lifetime, if any
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Whether a record still counts as a cache hit at `now`
    pub fn is_fresh(&self, record: &VerdictRecord, now: u64) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => record.age_secs(now) < ttl.as_secs(),
        }
    }

    /// Records classified before this instant are expired
    pub fn cutoff(&self, now: u64) -> Option<u64> {
        self.ttl.map(|ttl| now.saturating_sub(ttl.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::{DomainName, TrustScore, Verdict};

    fn record_at(classified_at: u64) -> VerdictRecord {
        VerdictRecord::new(
            DomainName::new("a.com").unwrap(),
            Verdict::Safe,
            TrustScore::clamped(9),
            vec![],
            "{}",
            classified_at,
        )
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.cache_ttl_secs, None);
        assert_eq!(config.sweep_interval_minutes, 60);
        assert_eq!(config.max_subscribers, 8);
        assert_eq!(config.subscriber_buffer, 4);
        assert!(config.auto_open_popup);
        assert_eq!(config.cache_policy(), CachePolicy::indefinite());
    }

    #[test]
    fn test_strict_config() {
        let config = SyncConfig::strict();
        assert_eq!(config.cache_ttl_secs, Some(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_sweep_interval_floor() {
        let config = SyncConfig {
            sweep_interval_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_values_saturate() {
        let config = SyncConfig {
            sweep_interval_minutes: u64::MAX,
            ..SyncConfig::expiring(u64::MAX)
        };
        assert_eq!(config.cache_ttl_secs, Some(u64::MAX));
        assert_eq!(config.sweep_interval(), Duration::from_secs(u64::MAX));

        let config: SyncConfig = toml::from_str("sweep_interval_minutes = 9223372036854775807").unwrap();
        assert_eq!(config.sweep_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_indefinite_policy_never_expires() {
        let policy = CachePolicy::indefinite();
        assert!(policy.is_fresh(&record_at(0), u64::MAX));
        assert_eq!(policy.cutoff(1_000), None);
    }

    #[test]
    fn test_ttl_policy() {
        let policy = CachePolicy::with_ttl(Duration::from_secs(100));
        assert!(policy.is_fresh(&record_at(1_000), 1_050));
        assert!(!policy.is_fresh(&record_at(1_000), 1_100));
        assert_eq!(policy.cutoff(1_100), Some(1_000));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            cache_ttl_secs = 86400
            sweep_interval_minutes = 30
            auto_open_popup = false
        "#;

        let config: SyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.cache_ttl_secs, Some(86400));
        assert_eq!(config.sweep_interval_minutes, 30);
        assert!(!config.auto_open_popup);
        assert_eq!(config.max_subscribers, 8);
    }
}
