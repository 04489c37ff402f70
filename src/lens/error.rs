//! Image search error types

use thiserror::Error;

/// Image search error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LensError {
    pub kind: LensErrorKind,
    pub message: String,
}

impl LensError {
    pub fn new(kind: LensErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LensErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LensErrorKind::Timeout, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(LensErrorKind::Upstream, message)
    }

    pub fn missing_api_key(service: &str) -> Self {
        Self::new(
            LensErrorKind::MissingApiKey,
            format!("{service} API key is not configured"),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(LensErrorKind::Decode, message)
    }

    /// Classify a transport failure from reqwest
    pub fn from_reqwest(service: &str, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("{service} request timed out: {e}"))
        } else if e.is_connect() {
            Self::network(format!("{service} connection failed: {e}"))
        } else {
            Self::network(format!("{service} request failed: {e}"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensErrorKind {
    /// Connection or transport failure
    Network,
    /// No answer within the configured deadline
    Timeout,
    /// Non-success status or a rejected request
    Upstream,
    /// Service is not configured
    MissingApiKey,
    /// Response body did not have the expected shape
    Decode,
}

impl LensErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::Timeout)
    }
}
