//! Provider-specific error types
//!
//! Converted into `toolrelay_foundation::Error` at the layer boundary.

use crate::retry::{RetryClassification, RetryableError};
use thiserror::Error;
use toolrelay_foundation::Error as FoundationError;

/// Errors from a completion request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// API key is missing or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded{}", .retry_after_ms.map(|ms| format!(", retry after {}ms", ms)).unwrap_or_default())]
    RateLimited { retry_after_ms: Option<u64> },

    /// 5xx
    #[error("Server error: {0}")]
    ServerError(String),

    /// Connection, DNS, timeout
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RetryableError for ProviderError {
    fn classify(&self) -> RetryClassification {
        match self {
            ProviderError::RateLimited { retry_after_ms } => RetryClassification::RateLimited {
                retry_after_ms: *retry_after_ms,
            },
            ProviderError::ServerError(_) | ProviderError::Network(_) => RetryClassification::Retry,
            _ => RetryClassification::NoRetry,
        }
    }
}

impl ProviderError {
    /// Map an HTTP error status and body
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let message = api_error_message(body);
        match status {
            401 | 403 => ProviderError::Authentication(message),
            429 => ProviderError::RateLimited {
                retry_after_ms: retry_after_from_body(body),
            },
            400 | 413 | 422 => ProviderError::InvalidRequest(message),
            404 => ProviderError::ModelNotAvailable(message),
            500..=599 => ProviderError::ServerError(message),
            _ => ProviderError::Unknown(format!("HTTP {}: {}", status, message)),
        }
    }
}

/// `error.message` from a JSON error body, or the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// `error.retry_after` (seconds) from a JSON error body, in milliseconds
fn retry_after_from_body(body: &str) -> Option<u64> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let secs = json.get("error")?.get("retry_after")?.as_f64()?;
    Some((secs * 1000.0) as u64)
}

impl From<ProviderError> for FoundationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => FoundationError::Config(msg),
            other => FoundationError::Provider(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            ProviderError::from_http_status(401, body),
            ProviderError::Authentication("invalid x-api-key".to_string())
        );
        assert!(matches!(
            ProviderError::from_http_status(529, "overloaded"),
            ProviderError::ServerError(_)
        ));
        assert_eq!(
            ProviderError::from_http_status(429, r#"{"error":{"retry_after":1.5}}"#),
            ProviderError::RateLimited {
                retry_after_ms: Some(1500)
            }
        );
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            ProviderError::Network("reset".into()).classify(),
            RetryClassification::Retry
        );
        assert_eq!(
            ProviderError::Authentication("no".into()).classify(),
            RetryClassification::NoRetry
        );
    }

    #[test]
    fn test_into_foundation_error() {
        let err: FoundationError = ProviderError::NotConfigured("key".into()).into();
        assert!(matches!(err, FoundationError::Config(_)));

        let err: FoundationError = ProviderError::ServerError("boom".into()).into();
        assert!(matches!(err, FoundationError::Provider(_)));
    }
}
