//! LLM error types

use serde::Serialize;
use thiserror::Error;

/// Failure talking to the model provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status returned by the provider, if it answered at all
    pub status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, detail: &str) -> Self {
        let (kind, label) = match status {
            401 | 403 => (LlmErrorKind::Auth, "Authentication failed"),
            429 => (LlmErrorKind::RateLimit, "Rate limit exceeded"),
            400 | 404 | 422 => (LlmErrorKind::InvalidRequest, "Invalid request"),
            500..=599 => (LlmErrorKind::ServerError, "Provider error"),
            _ => (LlmErrorKind::Unknown, "Unexpected status"),
        };
        Self {
            kind,
            message: format!("{label} ({status}): {detail}"),
            status: Some(status),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    /// Also used for malformed provider output
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    /// Connect failures and timeouts
    Network,
    RateLimit,
    /// Provider 5xx
    ServerError,
    Auth,
    InvalidRequest,
    Unknown,
}

impl LlmErrorKind {
    /// A later turn may succeed without any change on our side
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
