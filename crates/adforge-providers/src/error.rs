use std::time::Duration;

use thiserror::Error;

/// Provider failures. All variants are recoverable: the chain logs the kind
/// and falls through to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Quota exhausted: {0}")]
    Quota(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Short failure kind for logs and provenance records.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Http { .. } => "http",
            ProviderError::Quota(_) => "quota",
            ProviderError::MalformedResponse(_) => "malformed_response",
            ProviderError::Timeout(_) => "timeout",
        }
    }

    pub(crate) fn from_status(status: u16, message: String) -> Self {
        if status == 429 {
            ProviderError::Quota(message)
        } else {
            ProviderError::Http { status, message }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(Duration::ZERO)
        } else if e.is_decode() {
            ProviderError::MalformedResponse(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}
