//! Inbound message validation.
//!
//! The host page's window receives messages from every script and frame on
//! the page, so most traffic on the channel has nothing to do with the
//! journey.  A message is accepted only if every check below passes; the
//! first failing check decides the [`Rejection`]:
//!
//! | Step | Check                                                  | Rejection          |
//! |------|--------------------------------------------------------|--------------------|
//! | a    | origin is on the allow-list                            | `UntrustedOrigin`  |
//! | b    | source window is the journey frame (when known)        | `SourceMismatch`   |
//! | c    | payload is a JSON object                               | `NotAnObject`      |
//! | d    | payload `sessionId` equals the journey's session id    | `SessionMismatch`  |
//! | e    | `type`, `sessionId` present and `timestamp` is numeric | `MissingFields`    |
//! | f    | `type` is a known event type                           | `UnknownType`      |
//!
//! Rejections are not errors.  Callers drop the message and at most trace it.

use std::fmt;

use serde_json::Value;

use crate::domain::origins::TrustedOrigins;
use crate::protocol::messages::{JourneyEvent, JourneyEventType};

/// Why an inbound message was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UntrustedOrigin(String),
    SourceMismatch,
    NotAnObject,
    SessionMismatch,
    MissingFields,
    UnknownType(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UntrustedOrigin(origin) => write!(f, "untrusted origin {origin:?}"),
            Rejection::SourceMismatch => f.write_str("source is not the journey frame"),
            Rejection::NotAnObject => f.write_str("payload is not an object"),
            Rejection::SessionMismatch => f.write_str("payload is for another session"),
            Rejection::MissingFields => f.write_str("payload is missing required fields"),
            Rejection::UnknownType(tag) => write!(f, "unknown event type {tag}"),
        }
    }
}

/// Validates a raw inbound message and returns the typed event.
///
/// # Parameters
///
/// - `origin`           – `MessageEvent.origin` as reported by the browser.
/// - `source_matches`   – result of the source-window comparison (step b).
///   Pass `true` when the journey frame is not known.
/// - `payload`          – `MessageEvent.data` converted to JSON.
/// - `expected_session` – the journey's session id.
/// - `origins`          – the trusted-origin allow-list.
///
/// # Errors
///
/// Returns the [`Rejection`] of the first failing check.
pub fn validate_inbound(
    origin: &str,
    source_matches: bool,
    payload: &Value,
    expected_session: &str,
    origins: &TrustedOrigins,
) -> Result<JourneyEvent, Rejection> {
    // (a) origin
    if !origins.contains(origin) {
        return Err(Rejection::UntrustedOrigin(origin.to_string()));
    }

    // (b) source window
    if !source_matches {
        return Err(Rejection::SourceMismatch);
    }

    // (c) shape
    let object = payload.as_object().ok_or(Rejection::NotAnObject)?;

    // (d) session
    let session_id = object.get("sessionId").and_then(Value::as_str);
    if session_id != Some(expected_session) {
        return Err(Rejection::SessionMismatch);
    }

    // (e) required fields
    let tag = match object.get("type") {
        None | Some(Value::Null) => return Err(Rejection::MissingFields),
        Some(Value::String(s)) if s.is_empty() => return Err(Rejection::MissingFields),
        Some(other) => other,
    };
    let timestamp = object
        .get("timestamp")
        .and_then(numeric_timestamp)
        .ok_or(Rejection::MissingFields)?;
    let session_id = match session_id {
        Some(s) if !s.is_empty() => s,
        _ => return Err(Rejection::MissingFields),
    };

    // (f) event type
    let event_type = tag
        .as_str()
        .and_then(JourneyEventType::from_tag)
        .ok_or_else(|| Rejection::UnknownType(tag.to_string()))?;

    Ok(JourneyEvent {
        event_type,
        session_id: session_id.to_string(),
        data: object.get("data").filter(|v| !v.is_null()).cloned(),
        timestamp,
    })
}

/// Accepts any JSON number; fractional milliseconds are truncated.
fn numeric_timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|n| n.min(i64::MAX as u64) as i64))
        .or_else(|| value.as_f64().map(|f| f as i64))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: &str = "https://connect.data.one";
    const SESSION: &str = "test-session-123";

    fn validate(origin: &str, source_matches: bool, payload: Value) -> Result<JourneyEvent, Rejection> {
        validate_inbound(origin, source_matches, &payload, SESSION, &TrustedOrigins::builtin())
    }

    fn valid_payload(tag: &str) -> Value {
        json!({"type": tag, "sessionId": SESSION, "timestamp": 1_700_000_000_000_i64})
    }

    #[test]
    fn test_accepts_each_known_type() {
        for event_type in JourneyEventType::ALL {
            let event = validate(ORIGIN, true, valid_payload(event_type.as_str()))
                .expect("well-formed message must be accepted");
            assert_eq!(event.event_type, event_type);
            assert_eq!(event.session_id, SESSION);
        }
    }

    #[test]
    fn test_untrusted_origin_rejected_even_if_well_formed() {
        let result = validate("https://evil.example", true, valid_payload("complete"));
        assert_eq!(
            result,
            Err(Rejection::UntrustedOrigin("https://evil.example".to_string()))
        );
    }

    #[test]
    fn test_origin_checked_before_payload_shape() {
        // A non-object payload from an untrusted origin reports the origin.
        let result = validate("https://evil.example", true, json!("hello"));
        assert!(matches!(result, Err(Rejection::UntrustedOrigin(_))));
    }

    #[test]
    fn test_source_mismatch_rejected() {
        assert_eq!(
            validate(ORIGIN, false, valid_payload("exit")),
            Err(Rejection::SourceMismatch)
        );
    }

    #[test]
    fn test_non_object_payloads_rejected() {
        for payload in [json!("string"), json!(42), json!(null), json!([1, 2])] {
            assert_eq!(validate(ORIGIN, true, payload), Err(Rejection::NotAnObject));
        }
    }

    #[test]
    fn test_other_session_rejected() {
        let payload = json!({"type": "exit", "sessionId": "someone-else", "timestamp": 1});
        assert_eq!(validate(ORIGIN, true, payload), Err(Rejection::SessionMismatch));
    }

    #[test]
    fn test_missing_session_rejected_as_mismatch() {
        let payload = json!({"type": "exit", "timestamp": 1});
        assert_eq!(validate(ORIGIN, true, payload), Err(Rejection::SessionMismatch));
    }

    #[test]
    fn test_missing_type_rejected() {
        let payload = json!({"sessionId": SESSION, "timestamp": 1});
        assert_eq!(validate(ORIGIN, true, payload), Err(Rejection::MissingFields));
    }

    #[test]
    fn test_string_timestamp_rejected() {
        let payload = json!({"type": "exit", "sessionId": SESSION, "timestamp": "1"});
        assert_eq!(validate(ORIGIN, true, payload), Err(Rejection::MissingFields));
    }

    #[test]
    fn test_fractional_timestamp_truncated() {
        let payload = json!({"type": "exit", "sessionId": SESSION, "timestamp": 12.75});
        let event = validate(ORIGIN, true, payload).unwrap();
        assert_eq!(event.timestamp, 12);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let payload = json!({"type": "progress", "sessionId": SESSION, "timestamp": 1});
        assert_eq!(
            validate(ORIGIN, true, payload),
            Err(Rejection::UnknownType("\"progress\"".to_string()))
        );
    }

    #[test]
    fn test_non_string_type_rejected_as_unknown() {
        let payload = json!({"type": 7, "sessionId": SESSION, "timestamp": 1});
        assert!(matches!(
            validate(ORIGIN, true, payload),
            Err(Rejection::UnknownType(_))
        ));
    }

    #[test]
    fn test_data_is_carried_through() {
        let payload = json!({
            "type": "complete",
            "sessionId": SESSION,
            "timestamp": 1,
            "data": {"accountId": "acc-1"}
        });
        let event = validate(ORIGIN, true, payload).unwrap();
        assert_eq!(event.data, Some(json!({"accountId": "acc-1"})));
    }
}
