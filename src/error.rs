//! Error types for the provider layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request never produced a response (connect failure, timeout, ...)
    #[error("API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error {status}: {message}")]
    Status {
        status: u16,
        /// OpenAI error `type`, when the body carried one
        kind: Option<String>,
        message: String,
    },

    /// A success response body was not a chat completion
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether the failure is likely transient (timeout, connect, 408, 429, 5xx)
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(e) => e.is_timeout() || e.is_connect(),
            ProviderError::Status { status, kind, .. } => match status {
                408 | 500..=599 => true,
                429 => kind.as_deref() != Some("insufficient_quota"),
                _ => false,
            },
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, kind: Option<&str>) -> ProviderError {
        ProviderError::Status {
            status,
            kind: kind.map(str::to_string),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_status_retry_classification() {
        assert!(status(500, None).is_retryable());
        assert!(status(502, None).is_retryable());
        assert!(status(503, Some("server_error")).is_retryable());
        assert!(status(408, None).is_retryable());
        assert!(status(429, Some("rate_limit_exceeded")).is_retryable());
        assert!(!status(429, Some("insufficient_quota")).is_retryable());
        assert!(!status(400, Some("invalid_request_error")).is_retryable());
        assert!(!status(401, None).is_retryable());
        assert!(!status(404, None).is_retryable());
    }

    #[test]
    fn test_non_http_errors_are_not_retried() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ProviderError::Decode(decode).is_retryable());
        assert!(!ProviderError::Config("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(status(503, None).to_string(), "API error 503: boom");
    }
}
