use serde::Deserialize;
use serde_json::Value;

use crate::{
    domain::{DecodeMode, UserListState, UserProfile},
    error::PayloadError,
};

/// Parses a raw `/users` response body. Any valid JSON document is accepted.
pub fn parse_users_body(body: &[u8]) -> Result<Value, PayloadError> {
    Ok(serde_json::from_slice(body)?)
}

/// Turns a parsed body into the list state to apply.
///
/// `Opaque` keeps whatever the server sent, objects and scalars included.
/// `Strict` wants an array whose every element reads as a [`UserProfile`];
/// `null` also passes since the backend encodes an empty result that way.
pub fn decode_users_payload(
    payload: Value,
    mode: DecodeMode,
) -> Result<UserListState, PayloadError> {
    if mode == DecodeMode::Strict {
        check_user_schema(&payload)?;
    }
    Ok(UserListState::new(payload))
}

fn check_user_schema(payload: &Value) -> Result<(), PayloadError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Null => return Ok(()),
        other => {
            return Err(PayloadError::UnexpectedShape {
                found: json_kind(other),
            })
        }
    };

    for (index, item) in items.iter().enumerate() {
        UserProfile::deserialize(item).map_err(|source| PayloadError::Schema { index, source })?;
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
