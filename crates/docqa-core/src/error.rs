use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap any failure raised while building an index.
    pub fn index_build(err: impl std::fmt::Display) -> Self {
        Self::IndexBuild(err.to_string())
    }
}

/// Failure reported by an external provider (embedding or generation).
///
/// Callers decide whether to retry through [`ProviderError::is_transient`],
/// never by inspecting the message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Rate limit or quota exhaustion; the same request may succeed later.
    #[error("rate limited: {0}")]
    Transient(String),

    #[error("{0}")]
    Hard(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify a non-success HTTP response.
    ///
    /// 429 is transient. Other statuses are transient only when the error body
    /// carries a rate-limit or quota code in `error.code` or `error.type`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = ApiErrorBody::parse(body);
        let message = match &detail {
            Some(d) if !d.message.is_empty() => format!("HTTP {status}: {}", d.message),
            _ => format!("HTTP {status}: {}", truncate(body, 300)),
        };
        let quota_code = detail.as_ref().is_some_and(ApiErrorBody::is_rate_limit);
        if status == 429 || quota_code {
            Self::Transient(message)
        } else {
            Self::Hard(message)
        }
    }
}

const RATE_LIMIT_CODES: &[&str] = &["rate_limit_exceeded", "insufficient_quota", "quota_exceeded"];

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

impl ApiErrorBody {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ApiErrorEnvelope>(body).ok().map(|e| e.error)
    }

    fn is_rate_limit(&self) -> bool {
        let code = self.code.as_ref().and_then(serde_json::Value::as_str);
        [code, self.kind.as_deref()]
            .into_iter()
            .flatten()
            .any(|c| RATE_LIMIT_CODES.contains(&c))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_transient() {
        let err = ProviderError::from_status(429, "slow down");
        assert!(err.is_transient());
    }

    #[test]
    fn quota_code_in_body_is_transient() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = ProviderError::from_status(403, body);
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "rate limited: HTTP 403: You exceeded your current quota");
    }

    #[test]
    fn other_failures_are_hard() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert!(!ProviderError::from_status(401, body).is_transient());
        assert!(!ProviderError::from_status(500, "<html>oops</html>").is_transient());
    }

    #[test]
    fn message_mentioning_429_is_not_sniffed() {
        let err = ProviderError::from_status(400, "model returned 429 tokens");
        assert!(!err.is_transient());
    }
}
