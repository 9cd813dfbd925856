//! Error types for autodidact.
//!
//! Epistemic taxonomy:
//! - B_i falsified: Expected failures (blank input, malformed payload)
//! - I^B materialized: Infrastructure failures (network, timeout)
//! - K_i violated: Internal invariant violations (bugs)

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for autodidact.
#[derive(Debug, Error)]
pub enum AutodidactError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED — Belief proven wrong (expected failures)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error(transparent)]
    Validation(#[from] LocalValidationError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED — Bounded ignorance became known-bad
    // ═══════════════════════════════════════════════════════════════════

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // K_i VIOLATED — Invariant broken (bug, should not happen)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Blank input caught before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalValidationError {
    #[error("example is empty")]
    MissingExample,

    #[error("label is empty")]
    MissingLabel,

    #[error("example and label are empty")]
    MissingBoth,
}

/// Failure to obtain a decoded body from the learner service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("learner unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("learner returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A decodable body that does not match the expected response shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response is missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be an array of strings")]
    WrongType { field: &'static str },

    #[error("unknown literal '{0}' in current_hypothesis")]
    UnknownLiteral(String),
}

impl AutodidactError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the client can keep running after this error.
    ///
    /// Every per-action failure leaves the session usable; only setup
    /// problems are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Transport(_) | Self::Protocol(_)
        )
    }
}

/// Result type alias for autodidact.
pub type Result<T> = std::result::Result<T, AutodidactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classes() {
        assert!(AutodidactError::from(LocalValidationError::MissingLabel).is_recoverable());
        assert!(AutodidactError::from(ProtocolError::NotAnObject).is_recoverable());
        assert!(
            AutodidactError::from(TransportError::Timeout(Duration::from_secs(1)))
                .is_recoverable()
        );
        assert!(!AutodidactError::Internal("boom".into()).is_recoverable());
    }

    #[test]
    fn test_protocol_messages() {
        assert_eq!(
            ProtocolError::MissingField("log").to_string(),
            "response is missing field 'log'"
        );
        assert_eq!(
            ProtocolError::UnknownLiteral("x7".into()).to_string(),
            "unknown literal 'x7' in current_hypothesis"
        );
    }
}
