//! Shape checks for the conversation history a client resends on every chat call.
//!
//! Validation runs on the raw JSON value rather than a derived struct so that each
//! rule can report its own message: a missing field, a non-array, an empty list and
//! a malformed turn all surface differently to the widget.

use serde_json::{ Map, Value };
use thiserror::Error;

use crate::models::chat::{ Role, Turn };

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Conversation must be an array!")]
    NotAnArray,
    #[error("Conversation must not be empty!")]
    Empty,
    #[error("Message at index {index} is invalid: {reason}")]
    InvalidTurn {
        index: usize,
        reason: TurnError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("message must be an object")]
    NotAnObject,
    #[error("message must have exactly the keys \"role\" and \"text\"")]
    UnexpectedKeys,
    #[error("role must be \"user\" or \"model\"")]
    InvalidRole,
    #[error("text must be a non-empty string")]
    InvalidText,
}

/// Checks the `conversation` field of a chat request and returns the turns in the
/// order they were sent. `None` means the field was absent.
pub fn validate_conversation(conversation: Option<&Value>) -> Result<Vec<Turn>, ValidationError> {
    let items = match conversation {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(ValidationError::NotAnArray);
        }
    };

    if items.is_empty() {
        return Err(ValidationError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            validate_turn(item).map_err(|reason| ValidationError::InvalidTurn { index, reason })
        })
        .collect()
}

pub fn validate_turn(value: &Value) -> Result<Turn, TurnError> {
    let fields = value.as_object().ok_or(TurnError::NotAnObject)?;

    if !has_exact_keys(fields) {
        return Err(TurnError::UnexpectedKeys);
    }

    let role = fields
        .get("role")
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<Role>().ok())
        .ok_or(TurnError::InvalidRole)?;

    let text = match fields.get("text") {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        _ => {
            return Err(TurnError::InvalidText);
        }
    };

    Ok(Turn { role, text })
}

fn has_exact_keys(fields: &Map<String, Value>) -> bool {
    fields.len() == 2 && fields.keys().all(|key| key == "role" || key == "text")
}
