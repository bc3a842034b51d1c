//! Runtime settings for an embedded journey.
//!
//! The defaults are compiled in and are what a production embed uses.  A host
//! that needs a different allow-list (a staging build, an end-to-end test
//! environment) can supply the settings as TOML:
//!
//! ```toml
//! trusted_origins = ["https://connect.staging.data.one"]
//! teardown_delay_ms = 300
//! frame_title = "Connect your bank"
//! ```
//!
//! Every field has a serde default, so a partial document only overrides the
//! keys it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::frame::DEFAULT_FRAME_TITLE;
use crate::domain::origins::TrustedOrigins;

/// Delay between hiding the overlay and destroying it.  Matches the length of
/// the overlay's fade-out transition.
pub const DEFAULT_TEARDOWN_DELAY_MS: u64 = 300;

/// Error type for settings parsing.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The TOML content could not be parsed or failed a field constraint
    /// (for example an empty `trusted_origins` list).
    #[error("failed to parse journey settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings shared by every journey created with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedSettings {
    /// Origins accepted for the connection URL and for inbound messages.
    /// The first entry is the outbound target origin.
    #[serde(default)]
    pub trusted_origins: TrustedOrigins,

    /// Milliseconds between `close()` and the overlay being destroyed on
    /// `remove()` or a `complete` event.
    #[serde(default = "default_teardown_delay_ms")]
    pub teardown_delay_ms: u64,

    /// `title` attribute of the embedded frame.
    #[serde(default = "default_frame_title")]
    pub frame_title: String,
}

fn default_teardown_delay_ms() -> u64 {
    DEFAULT_TEARDOWN_DELAY_MS
}

fn default_frame_title() -> String {
    DEFAULT_FRAME_TITLE.to_string()
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            trusted_origins: TrustedOrigins::builtin(),
            teardown_delay_ms: DEFAULT_TEARDOWN_DELAY_MS,
            frame_title: default_frame_title(),
        }
    }
}

impl EmbedSettings {
    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] if the document is not valid TOML, a
    /// field has the wrong type, or `trusted_origins` is empty.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn teardown_delay(&self) -> Duration {
        Duration::from_millis(self.teardown_delay_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_teardown_delay_is_300ms() {
        assert_eq!(EmbedSettings::default().teardown_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_default_uses_builtin_origins() {
        assert_eq!(
            EmbedSettings::default().trusted_origins,
            TrustedOrigins::builtin()
        );
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        // Act
        let settings = EmbedSettings::from_toml_str("").expect("empty TOML is valid");

        // Assert
        assert_eq!(settings, EmbedSettings::default());
    }

    #[test]
    fn test_partial_document_overrides_named_keys_only() {
        let settings = EmbedSettings::from_toml_str(
            r#"trusted_origins = ["https://connect.staging.data.one"]"#,
        )
        .unwrap();

        assert_eq!(
            settings.trusted_origins.primary(),
            "https://connect.staging.data.one"
        );
        assert_eq!(settings.teardown_delay_ms, DEFAULT_TEARDOWN_DELAY_MS);
        assert_eq!(settings.frame_title, DEFAULT_FRAME_TITLE);
    }

    #[test]
    fn test_empty_origin_list_rejected() {
        let result = EmbedSettings::from_toml_str("trusted_origins = []");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let result = EmbedSettings::from_toml_str(r#"teardown_delay_ms = "soon""#);
        assert!(result.is_err());
    }
}
