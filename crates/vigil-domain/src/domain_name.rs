//! Domain name module - the cache key for verdicts

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a navigation URL yields no domain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The URL could not be parsed at all
    #[error("Unparseable URL: {0}")]
    Unparseable(String),

    /// The URL parsed but is not http or https
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The URL has an http(s) scheme but no host
    #[error("URL has no host: {0}")]
    MissingHost(String),

    /// The host failed domain validation
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// Normalized hostname
///
/// Lowercase, trimmed, without a trailing root dot. Two URLs on the same
/// host always map to the same `DomainName`, which is what makes it usable
/// as the verdict cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Normalize and validate a bare hostname
    ///
    /// # Errors
    /// Returns `UrlError::InvalidDomain` for empty hosts or hosts containing
    /// whitespace, path separators, ports or credentials.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UrlError> {
        let trimmed = value.as_ref().trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let normalized = trimmed.to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(UrlError::InvalidDomain("domain cannot be empty".to_string()));
        }

        if normalized
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | ':' | '@' | '?' | '#'))
        {
            return Err(UrlError::InvalidDomain(normalized));
        }

        Ok(Self(normalized))
    }

    /// Extract the domain from an absolute page URL
    ///
    /// Only `http` and `https` URLs carry a domain; everything else
    /// (`chrome://`, `ftp://`, `about:blank`, ...) is rejected.
    pub fn from_url(raw: &str) -> Result<Self, UrlError> {
        let parsed = url::Url::parse(raw.trim())
            .map_err(|e| UrlError::Unparseable(format!("{}: {}", raw, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(UrlError::UnsupportedScheme(other.to_string())),
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| UrlError::MissingHost(raw.to_string()))?;

        Self::new(host)
    }

    /// Accept either a full URL or a bare hostname
    ///
    /// Used by command-line entry points where users type `example.com`
    /// as often as `https://example.com/page`.
    pub fn from_url_or_host(input: &str) -> Result<Self, UrlError> {
        if input.contains("://") {
            Self::from_url(input)
        } else {
            Self::new(input)
        }
    }

    /// Get the domain as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DomainName {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(domain: DomainName) -> Self {
        domain.0
    }
}

impl std::str::FromStr for DomainName {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(host in "[a-zA-Z0-9-]{1,20}(\\.[a-zA-Z]{2,6}){1,2}") {
            let once = DomainName::new(&host).unwrap();
            let twice = DomainName::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_url_and_host_agree(host in "[a-z0-9]{1,20}\\.[a-z]{2,6}", path in "[a-z0-9/]{0,20}") {
            let from_host = DomainName::new(&host).unwrap();
            let from_url = DomainName::from_url(&format!("https://{}/{}", host, path)).unwrap();
            prop_assert_eq!(from_host, from_url);
        }
    }
}
