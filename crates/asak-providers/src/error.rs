//! Errors raised by completion services. Callers receive these unchanged.

use thiserror::Error;

/// Failure talking to an upstream chat completion endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("error event in stream: {0}")]
    Stream(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ProviderError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the upstream rejected the call for quota reasons (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
