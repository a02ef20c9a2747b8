//! HTTP Gateway Implementation
//!
//! Talks to the classification service's `/analyze` endpoint.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Configurable endpoint and timeout
//! - Optional retries with exponential backoff (single attempt by default)
//!
//! # Examples
//!
//! ```no_run
//! use vigil_gateway::HttpGateway;
//!
//! let gateway = HttpGateway::new("http://localhost:5000").unwrap();
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use vigil_domain::traits::ClassificationGateway;
use vigil_domain::{ClassificationResult, DomainName, GatewayError};

/// Default classification service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Default timeout for classification requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts (no retry)
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Longest body excerpt carried in an error message
const ERROR_BODY_LIMIT: usize = 200;

/// Classification gateway backed by the remote HTTP service
pub struct HttpGateway {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

/// Request body for the analyze endpoint
#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    domain: &'a str,
}

impl HttpGateway {
    /// Create a gateway for the given endpoint with the default timeout
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unreachable` if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a gateway with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a gateway pointing at `DEFAULT_ENDPOINT`
    pub fn default_endpoint() -> Result<Self, GatewayError> {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Set the maximum number of attempts (minimum 1)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Endpoint this gateway posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One request/response exchange
    ///
    /// `Ok(Err(_))` marks a failure worth retrying (transport error or a
    /// server error without a readable body).
    async fn attempt(
        &self,
        url: &str,
        domain: &DomainName,
    ) -> Result<Result<ClassificationResult, GatewayError>, GatewayError> {
        let response = match self
            .client
            .post(url)
            .json(&AnalyzeRequest { domain: domain.as_str() })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(Err(GatewayError::Unreachable(format!("Request failed: {}", e))));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(Err(GatewayError::Unreachable(format!("Failed to read response: {}", e))));
            }
        };

        match ClassificationResult::from_json(&body) {
            // The service reports its own failures in the body; hand those back
            // for the caller to interpret.
            Ok(result) => Ok(Ok(result)),
            Err(e) if status.is_success() => Err(GatewayError::Malformed(format!(
                "Failed to parse response: {}",
                e
            ))),
            Err(_) if status.is_server_error() => Ok(Err(GatewayError::Rejected(format!(
                "HTTP {}: {}",
                status,
                excerpt(&body)
            )))),
            Err(_) => Err(GatewayError::Rejected(format!("HTTP {}: {}", status, excerpt(&body)))),
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    trimmed.chars().take(ERROR_BODY_LIMIT).collect()
}

#[async_trait]
impl ClassificationGateway for HttpGateway {
    async fn classify(&self, domain: &DomainName) -> Result<ClassificationResult, GatewayError> {
        let url = format!("{}/analyze", self.endpoint);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.attempt(&url, domain).await? {
                Ok(result) => {
                    tracing::debug!(domain = %domain, status = %result.status, "classification response received");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(domain = %domain, attempt = attempts + 1, error = %e, "classification attempt failed");
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            GatewayError::Unreachable("Max retries exceeded".to_string())
        }))
    }
}
