//! Journey lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally visible status of a journey.
///
/// ```text
/// Initialising  ──(config valid + overlay created)──►  Ready
/// ```
///
/// The transition is one-way.  A journey whose construction fails is never
/// handed to the caller, so `Initialising` is only observable from inside the
/// constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStatus {
    /// Construction-time default.
    #[default]
    Initialising,
    /// Configuration validated and overlay materialised; `start()` is allowed.
    Ready,
}

impl JourneyStatus {
    /// Returns the wire/display name (`"initialising"` or `"ready"`).
    pub fn as_str(self) -> &'static str {
        match self {
            JourneyStatus::Initialising => "initialising",
            JourneyStatus::Ready => "ready",
        }
    }

    pub fn is_ready(self) -> bool {
        self == JourneyStatus::Ready
    }
}

impl fmt::Display for JourneyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
