//! Session state and the wire types exchanged with the learner.
//!
//! K_i: SessionState is a value; it is replaced, never edited.
//! B_i: A server payload may be malformed → reconciled before use.

use crate::models::{Literal, LocalValidationError};
use serde::{Deserialize, Serialize};

/// Ordered literals the learner currently believes relevant.
pub type Hypothesis = Vec<Literal>;

/// Ordered learning-step descriptions.
pub type Log = Vec<String>;

/// Client-held snapshot of the learner's hypothesis and log.
///
/// Both halves always come from the same server response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    hypothesis: Hypothesis,
    log: Log,
}

impl SessionState {
    /// The state a client starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a state from a hypothesis and log taken from one response.
    pub fn new(hypothesis: Hypothesis, log: Log) -> Self {
        Self { hypothesis, log }
    }

    pub fn hypothesis(&self) -> &[Literal] {
        &self.hypothesis
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Membership test used for chart slots.
    pub fn contains(&self, literal: Literal) -> bool {
        self.hypothesis.contains(&literal)
    }

    pub fn is_empty(&self) -> bool {
        self.hypothesis.is_empty() && self.log.is_empty()
    }
}

/// A labeled example ready to be sent.
///
/// K_i: Both fields are trimmed and non-empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    pub example: String,
    pub label: String,
}

impl Example {
    /// Validate raw field contents.
    ///
    /// This is the only local check performed before a network call.
    pub fn new(example: &str, label: &str) -> Result<Self, LocalValidationError> {
        let example = example.trim();
        let label = label.trim();

        match (example.is_empty(), label.is_empty()) {
            (true, true) => Err(LocalValidationError::MissingBoth),
            (true, false) => Err(LocalValidationError::MissingExample),
            (false, true) => Err(LocalValidationError::MissingLabel),
            (false, false) => Ok(Self {
                example: example.to_string(),
                label: label.to_string(),
            }),
        }
    }
}

/// Decoded but unvalidated response body from the learner.
///
/// B_i: Shape is unknown until reconciled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ServerResponse(pub serde_json::Value);

impl ServerResponse {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for ServerResponse {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
