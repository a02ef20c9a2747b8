//! Classification service payload
//!
//! The classification service is loose about its response shape, so this
//! module accepts several encodings for the same field and normalizes them
//! instead of failing:
//!
//! - `trust_score` may be missing, `-1`, a float or a numeric string
//! - `alternatives` may be a list of objects, a `name -> url` map, or an
//!   `{"error": ...}` object
//! - `policy_analysis` entries may be plain strings or `[headline, detail]`
//!   pairs
//! - text fields and `is_safe` of the wrong type read as absent

use crate::Alternative;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Status value the service uses for a completed analysis
pub const SUCCESS_STATUS: &str = "success";

/// Fallback text shown when the service rejects a domain without saying why
pub const DEFAULT_FAILURE_MESSAGE: &str = "Unable to analyze this website. Use at your own risk.";

/// One entry of the service's policy analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyFinding {
    /// Short summary (e.g. "Privacy Concerns Detected")
    pub headline: String,
    /// Longer explanation, when the service provided one
    pub detail: Option<String>,
}

/// Response from the classification service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassificationResult {
    /// `"success"` or an error status
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: String,

    /// The verdict flag; missing on malformed success responses
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_safe: Option<bool>,

    /// Unclamped score as reported
    #[serde(default, deserialize_with = "lenient_score")]
    pub trust_score: Option<i64>,

    /// Suggested replacements
    #[serde(default, deserialize_with = "lenient_alternatives")]
    pub alternatives: Vec<Alternative>,

    /// Per-document analysis results
    #[serde(default, deserialize_with = "lenient_findings")]
    pub policy_analysis: Option<Vec<PolicyFinding>>,

    /// Privacy policy URL of the analyzed domain
    #[serde(default, deserialize_with = "lenient_text")]
    pub privacy_policy: Option<String>,

    /// Human-readable error text on failures
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,

    /// Response body exactly as received
    #[serde(skip)]
    pub raw: String,
}

impl ClassificationResult {
    /// Parse a response body, keeping the body text in `raw`
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let mut result: ClassificationResult = serde_json::from_str(body)?;
        result.raw = body.to_string();
        Ok(result)
    }

    /// Whether the service reported a completed analysis
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// The service's error message, or a generic one
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
    }
}

/// Parse `policy_analysis` out of a stored raw payload
///
/// Never fails: anything unreadable yields an empty list.
pub fn findings_from_raw(raw: &str) -> Vec<PolicyFinding> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("policy_analysis").and_then(findings_from_value))
        .unwrap_or_default()
}

/// Parse `privacy_policy` out of a stored raw payload
pub fn privacy_policy_from_raw(raw: &str) -> Option<String> {
    serde_json::from_str::<Value>(raw)
        .ok()?
        .get("privacy_policy")?
        .as_str()
        .map(str::to_string)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }))
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}

fn lenient_alternatives<'de, D>(deserializer: D) -> Result<Vec<Alternative>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(alternatives_from_value).unwrap_or_default())
}

fn lenient_findings<'de, D>(deserializer: D) -> Result<Option<Vec<PolicyFinding>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(findings_from_value))
}

fn alternatives_from_value(value: Value) -> Vec<Alternative> {
    match value {
        Value::Array(items) => items.iter().filter_map(alternative_from_object).collect(),
        Value::Object(map) => map
            .into_iter()
            .filter(|(name, _)| name != "error")
            .filter_map(|(name, url)| match url {
                Value::String(url) if is_http_url(&url) => Some(Alternative::new(name, url)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn alternative_from_object(item: &Value) -> Option<Alternative> {
    let name = item
        .get("domain")
        .or_else(|| item.get("name"))
        .and_then(Value::as_str)?
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }

    let url = item
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if is_http_url(&name) {
                name.clone()
            } else {
                format!("https://{}", name)
            }
        });

    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
    let data = item.get("data");

    Some(Alternative {
        explanation: text(item.get("explanation")),
        privacy_policy: text(data.and_then(|d| d.get("privacy_policy"))),
        terms_and_conditions: text(data.and_then(|d| d.get("terms_and_conditions"))),
        name,
        url,
    })
}

fn findings_from_value(value: &Value) -> Option<Vec<PolicyFinding>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(headline) => Some(PolicyFinding {
                    headline: headline.clone(),
                    detail: None,
                }),
                Value::Array(parts) => {
                    let headline = parts.first()?.as_str()?.to_string();
                    let detail = parts.get(1).and_then(Value::as_str).map(str::to_string);
                    Some(PolicyFinding { headline, detail })
                }
                _ => None,
            })
            .collect(),
    )
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
