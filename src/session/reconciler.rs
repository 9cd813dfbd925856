//! Payload validation and state replacement.
//!
//! K_i: A payload either yields a complete SessionState or nothing.
//! B_i: The server sends the documented shape (might not) → ProtocolError

use crate::models::{Literal, ProtocolError, ServerResponse, SessionState};
use serde_json::Value;
use tracing::debug;

const HYPOTHESIS_FIELD: &str = "current_hypothesis";
const LOG_FIELD: &str = "log";
const STATUS_FIELD: &str = "status";

/// Build a replacement state from a server payload.
///
/// Pure: the result depends on the payload alone. Hypothesis and log are
/// passed through in the order received, without dedup or filtering.
pub fn reconcile(payload: &ServerResponse) -> Result<SessionState, ProtocolError> {
    let object = payload
        .as_value()
        .as_object()
        .ok_or(ProtocolError::NotAnObject)?;

    let hypothesis = string_array(object.get(HYPOTHESIS_FIELD), HYPOTHESIS_FIELD)?
        .into_iter()
        .map(|id| Literal::from_wire(id).ok_or_else(|| ProtocolError::UnknownLiteral(id.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let log = string_array(object.get(LOG_FIELD), LOG_FIELD)?
        .into_iter()
        .map(str::to_string)
        .collect();

    if let Some(status) = object.get(STATUS_FIELD).and_then(Value::as_str) {
        debug!(status = status, "Learner reported status");
    }

    Ok(SessionState::new(hypothesis, log))
}

fn string_array<'a>(
    value: Option<&'a Value>,
    field: &'static str,
) -> Result<Vec<&'a str>, ProtocolError> {
    let items = value
        .ok_or(ProtocolError::MissingField(field))?
        .as_array()
        .ok_or(ProtocolError::WrongType { field })?;

    items
        .iter()
        .map(|item| item.as_str().ok_or(ProtocolError::WrongType { field }))
        .collect()
}
