//! The journey message envelope.
//!
//! The embedded journey reports its progress to the host page with three
//! event types.  The host can also send the same envelope back into the frame.
//!
//! # JSON representation
//!
//! Field names follow the browser-side convention (`sessionId`, not
//! `session_id`) because the other end of the channel is JavaScript:
//!
//! ```json
//! {"type":"exit","sessionId":"abc","timestamp":1718000000000}
//! ```
//!
//! `data` is opaque to this crate and omitted when absent.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of journey event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyEventType {
    /// The user finished the journey.  `data` carries the result.
    Complete,
    /// The journey failed.  `data` describes the failure.
    Error,
    /// The user dismissed the journey.
    Exit,
}

impl JourneyEventType {
    pub const ALL: [JourneyEventType; 3] = [
        JourneyEventType::Complete,
        JourneyEventType::Error,
        JourneyEventType::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JourneyEventType::Complete => "complete",
            JourneyEventType::Error => "error",
            JourneyEventType::Exit => "exit",
        }
    }

    /// Parses a wire tag.  Unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for JourneyEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message exchanged with the embedded journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyEvent {
    #[serde(rename = "type")]
    pub event_type: JourneyEventType,

    /// Session the message belongs to.  Must equal the journey's session id.
    pub session_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Milliseconds since the Unix epoch, stamped by the sender.
    pub timestamp: i64,
}

impl JourneyEvent {
    pub fn new(
        event_type: JourneyEventType,
        session_id: impl Into<String>,
        data: Option<Value>,
        timestamp: i64,
    ) -> Self {
        Self {
            event_type,
            session_id: session_id.into(),
            data,
            timestamp,
        }
    }

    /// Serialises the envelope to a JSON value ready for `postMessage`.
    pub fn to_value(&self) -> Value {
        // Serialising a struct of strings, integers and `Value`s cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_tags() {
        assert_eq!(JourneyEventType::Complete.as_str(), "complete");
        assert_eq!(JourneyEventType::from_tag("exit"), Some(JourneyEventType::Exit));
        assert_eq!(JourneyEventType::from_tag("Exit"), None);
        assert_eq!(JourneyEventType::from_tag("progress"), None);
    }

    #[test]
    fn test_envelope_uses_browser_field_names() {
        // Arrange
        let event = JourneyEvent::new(
            JourneyEventType::Complete,
            "s-1",
            Some(json!({"accountId": "42"})),
            1_718_000_000_000,
        );

        // Act
        let value = event.to_value();

        // Assert
        assert_eq!(
            value,
            json!({
                "type": "complete",
                "sessionId": "s-1",
                "data": {"accountId": "42"},
                "timestamp": 1_718_000_000_000_i64
            })
        );
    }

    #[test]
    fn test_absent_data_is_omitted() {
        let event = JourneyEvent::new(JourneyEventType::Exit, "s-1", None, 1);
        let value = event.to_value();
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_deserialize_from_browser_json() {
        let text = r#"{"type":"error","sessionId":"s-9","data":"boom","timestamp":5}"#;
        let event: JourneyEvent = serde_json::from_str(text).unwrap();
        assert_eq!(event.event_type, JourneyEventType::Error);
        assert_eq!(event.session_id, "s-9");
        assert_eq!(event.data, Some(json!("boom")));
    }
}
