//! Error types shared by the journey crates.
//!
//! Only two categories are ever returned to the embedding page: configuration
//! errors (construction) and lifecycle-state errors (`start()` in the wrong
//! status).  Host and remote errors travel to the `on_error` callback or into
//! the log; they are defined here so both crates agree on their shape.

use thiserror::Error;

use crate::domain::status::JourneyStatus;
use crate::protocol::failure::RemoteError;

/// Reasons a journey configuration is rejected at construction time.
///
/// Variants are listed in the order the checks run, so the first failing rule
/// is always the one reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("connectionUrl is required")]
    MissingConnectionUrl,

    #[error("sessionId is required")]
    MissingSessionId,

    /// The URL did not parse.  Carries the parser's explanation.
    #[error("connectionUrl must be a valid URL: {0}")]
    InvalidUrl(String),

    /// The URL parsed but its origin is not on the allow-list.
    #[error("connectionUrl must be a valid connection URL (untrusted origin {origin})")]
    UntrustedOrigin { origin: String },

    #[error("connectionUrl must have a token parameter")]
    MissingToken,

    #[error("sessionId must be a non-empty string")]
    BlankSessionId,
}

/// Failures reported by the host page (DOM, window messaging).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// `show()` was called on an overlay that was never created or was destroyed.
    #[error("overlay not created; call create() first")]
    OverlayNotCreated,

    /// The embedded frame fired its `error` event.
    #[error("journey iframe failed to load")]
    FrameLoadFailed,

    /// A DOM call threw.
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// Registering a listener or posting a message threw.
    #[error("window messaging failed: {0}")]
    Messaging(String),
}

/// Any error a journey can report, either as a return value or through
/// the `on_error` callback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JourneyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Journey is not ready. Current status: {status}")]
    NotReady { status: JourneyStatus },

    #[error(transparent)]
    Host(#[from] HostError),

    /// Error reported by the embedded journey through an `error` message.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_match_contract() {
        assert_eq!(
            ConfigError::MissingConnectionUrl.to_string(),
            "connectionUrl is required"
        );
        assert_eq!(ConfigError::MissingSessionId.to_string(), "sessionId is required");
        assert!(ConfigError::InvalidUrl("relative URL without a base".into())
            .to_string()
            .starts_with("connectionUrl must be a valid URL"));
        assert_eq!(
            ConfigError::MissingToken.to_string(),
            "connectionUrl must have a token parameter"
        );
    }

    #[test]
    fn test_not_ready_message_includes_status() {
        let err = JourneyError::NotReady {
            status: JourneyStatus::Initialising,
        };
        assert_eq!(
            err.to_string(),
            "Journey is not ready. Current status: initialising"
        );
    }

    #[test]
    fn test_config_error_converts_transparently() {
        // Arrange
        let err: JourneyError = ConfigError::BlankSessionId.into();

        // Assert – the wrapper must not change the message the caller sees
        assert_eq!(err.to_string(), "sessionId must be a non-empty string");
    }
}
