//! Vigil Classification Gateway Layer
//!
//! Implementations of the `ClassificationGateway` trait from `vigil-domain`.
//!
//! # Gateways
//!
//! - `MockGateway`: scripted, call-counting gateway for testing
//! - `HttpGateway`: the remote classification service over HTTP
//!
//! # Examples
//!
//! ```
//! use vigil_gateway::MockGateway;
//! use vigil_domain::traits::ClassificationGateway;
//! use vigil_domain::DomainName;
//!
//! let gateway = MockGateway::new();
//! gateway.add_response("a.com", serde_json::json!({"status": "success", "is_safe": true}));
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(gateway.classify(&DomainName::new("a.com").unwrap())).unwrap();
//! assert_eq!(result.is_safe, Some(true));
//! assert_eq!(gateway.call_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod http;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use vigil_domain::traits::ClassificationGateway;
use vigil_domain::{ClassificationResult, DomainName, GatewayError};

pub use http::HttpGateway;

/// What the mock answers for one domain
#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Failure(GatewayError),
}

/// Mock classification gateway for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Clones share scripts and counters, so a test can keep one handle while
/// the code under test owns another.
///
/// Domains with no scripted reply fail with `GatewayError::Unreachable`.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    calls: Arc<Mutex<Vec<DomainName>>>,
    call_count: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGateway {
    /// Create a gateway with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, to widen race windows in tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a JSON response for a domain
    pub fn add_response(&self, domain: &str, body: serde_json::Value) {
        self.add_body(domain, body.to_string());
    }

    /// Script a raw response body for a domain (may be invalid JSON)
    pub fn add_body(&self, domain: &str, body: impl Into<String>) {
        lock(&self.replies).insert(domain.to_ascii_lowercase(), MockReply::Body(body.into()));
    }

    /// Script a failure for a domain
    pub fn add_failure(&self, domain: &str, error: GatewayError) {
        lock(&self.replies).insert(domain.to_ascii_lowercase(), MockReply::Failure(error));
    }

    /// Total number of classify calls
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of classify calls for one domain
    pub fn calls_for(&self, domain: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|d| d.as_str() == domain)
            .count()
    }

    /// Reset the call counters
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl ClassificationGateway for MockGateway {
    async fn classify(&self, domain: &DomainName) -> Result<ClassificationResult, GatewayError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.calls).push(domain.clone());

        let reply = lock(&self.replies).get(domain.as_str()).cloned();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(MockReply::Body(body)) => ClassificationResult::from_json(&body)
                .map_err(|e| GatewayError::Malformed(format!("Failed to parse response: {}", e))),
            Some(MockReply::Failure(error)) => Err(error),
            None => Err(GatewayError::Unreachable(format!(
                "no scripted response for {}",
                domain
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn domain(s: &str) -> DomainName {
        DomainName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_mock_gateway_scripted_response() {
        let gateway = MockGateway::new();
        gateway.add_response("a.com", json!({"status": "success", "is_safe": false, "trust_score": 2}));

        let result = gateway.classify(&domain("a.com")).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.is_safe, Some(false));
        assert_eq!(result.trust_score, Some(2));
        assert!(!result.raw.is_empty());
    }

    #[tokio::test]
    async fn test_mock_gateway_unscripted_domain_fails() {
        let gateway = MockGateway::new();
        let result = gateway.classify(&domain("nowhere.com")).await;
        assert!(matches!(result, Err(GatewayError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_mock_gateway_failure() {
        let gateway = MockGateway::new();
        gateway.add_failure("a.com", GatewayError::Rejected("Legal documents not found".into()));

        let result = gateway.classify(&domain("a.com")).await;
        assert_eq!(result, Err(GatewayError::Rejected("Legal documents not found".into())));
    }

    #[tokio::test]
    async fn test_mock_gateway_invalid_body_is_malformed() {
        let gateway = MockGateway::new();
        gateway.add_body("a.com", "<html>502 Bad Gateway</html>");

        let result = gateway.classify(&domain("a.com")).await;
        assert!(matches!(result, Err(GatewayError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_mock_gateway_call_count_shared_by_clones() {
        let gateway1 = MockGateway::new();
        let gateway2 = gateway1.clone();
        gateway1.add_response("a.com", json!({"status": "success", "is_safe": true}));

        gateway2.classify(&domain("a.com")).await.unwrap();
        gateway2.classify(&domain("b.com")).await.unwrap_err();

        assert_eq!(gateway1.call_count(), 2);
        assert_eq!(gateway1.calls_for("a.com"), 1);

        gateway1.reset_call_count();
        assert_eq!(gateway2.call_count(), 0);
    }
}
