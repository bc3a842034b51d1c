//! Normalisation of `error` event payloads.
//!
//! The journey frame is free to describe a failure however it likes: a
//! serialised `Error` (`{"name":"...","message":"..."}`), a wrapper object with
//! an `error` field, a bare string, or nothing at all.  [`normalize_error`]
//! maps every shape onto a single [`RemoteError`] so the host's `on_error`
//! callback always receives the same type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default error name, matching a plain JavaScript `Error`.
pub const DEFAULT_ERROR_NAME: &str = "Error";

/// Message used when the payload carries no usable description.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// An error reported by the embedded journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub name: String,
    pub message: String,
    /// The original payload fragment the error was read from, if structured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RemoteError {
    /// Wraps a plain message as a generic `Error`.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_ERROR_NAME.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unknown() -> Self {
        Self::from_message(UNKNOWN_ERROR_MESSAGE)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Converts the `data` of an `error` event into a [`RemoteError`].
///
/// Precedence:
///
/// 1. an error-like object (string `message`, optional string `name`) is used as-is;
/// 2. otherwise a truthy `error` field is used, itself normalised the same way;
/// 3. otherwise a string payload becomes the message of a generic error;
/// 4. otherwise the result is `"Unknown error"`.
pub fn normalize_error(data: Option<&Value>) -> RemoteError {
    let Some(data) = data else {
        return RemoteError::unknown();
    };

    if let Some(err) = error_like(data) {
        return err;
    }

    if let Some(inner) = data.get("error").filter(|v| is_truthy(v)) {
        return match inner {
            Value::String(s) => RemoteError::from_message(s.clone()),
            other => error_like(other).unwrap_or_else(|| RemoteError {
                name: DEFAULT_ERROR_NAME.to_string(),
                message: other.to_string(),
                details: Some(other.clone()),
            }),
        };
    }

    match data {
        Value::String(s) => RemoteError::from_message(s.clone()),
        _ => RemoteError::unknown(),
    }
}

fn error_like(value: &Value) -> Option<RemoteError> {
    let object = value.as_object()?;
    let message = object.get("message")?.as_str()?;
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ERROR_NAME);

    Some(RemoteError {
        name: name.to_string(),
        message: message.to_string(),
        details: Some(value.clone()),
    })
}

/// JavaScript truthiness for JSON values.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_payload_is_wrapped() {
        // Act
        let err = normalize_error(Some(&json!("token expired")));

        // Assert
        assert_eq!(err.name, "Error");
        assert_eq!(err.message, "token expired");
        assert_eq!(err.to_string(), "Error: token expired");
    }

    #[test]
    fn test_error_like_object_used_as_is() {
        let payload = json!({"name": "TypeError", "message": "x is undefined", "stack": "..."});
        let err = normalize_error(Some(&payload));
        assert_eq!(err.name, "TypeError");
        assert_eq!(err.message, "x is undefined");
        assert_eq!(err.details, Some(payload));
    }

    #[test]
    fn test_error_like_object_without_name_defaults() {
        let err = normalize_error(Some(&json!({"message": "bad"})));
        assert_eq!(err.name, "Error");
    }

    #[test]
    fn test_error_field_string() {
        let err = normalize_error(Some(&json!({"error": "institution unavailable"})));
        assert_eq!(err.message, "institution unavailable");
    }

    #[test]
    fn test_error_field_object() {
        let err = normalize_error(Some(&json!({
            "error": {"name": "BankError", "message": "down"}
        })));
        assert_eq!(err.name, "BankError");
        assert_eq!(err.message, "down");
    }

    #[test]
    fn test_error_field_of_other_shape_is_stringified() {
        let err = normalize_error(Some(&json!({"error": 503})));
        assert_eq!(err.message, "503");
        assert_eq!(err.details, Some(json!(503)));
    }

    #[test]
    fn test_falsy_error_field_falls_through_to_unknown() {
        let err = normalize_error(Some(&json!({"error": ""})));
        assert_eq!(err, RemoteError::unknown());
    }

    #[test]
    fn test_missing_payload_is_unknown() {
        assert_eq!(normalize_error(None).message, "Unknown error");
    }

    #[test]
    fn test_unrecognised_shapes_are_unknown() {
        for payload in [json!(42), json!({"code": 7}), json!([1])] {
            assert_eq!(normalize_error(Some(&payload)), RemoteError::unknown());
        }
    }
}
