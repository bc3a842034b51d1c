//! Connection URL and session id validation.
//!
//! The journey is loaded from a connection URL issued by the journey backend.
//! Before anything is put on the page the URL and the session id are checked
//! in a fixed order, so the error reported for a bad config is deterministic:
//!
//! ```text
//! 1. connection URL present        → ConfigError::MissingConnectionUrl
//! 2. session id present            → ConfigError::MissingSessionId
//! 3. URL parses                    → ConfigError::InvalidUrl
//!    origin on the allow-list      → ConfigError::UntrustedOrigin
//! 4. non-blank `token` parameter   → ConfigError::MissingToken
//! 5. session id not just whitespace → ConfigError::BlankSessionId
//! ```

use url::Url;

use crate::domain::origins::TrustedOrigins;
use crate::error::ConfigError;

/// Name of the query parameter carrying the backend-issued journey token.
pub const TOKEN_PARAM: &str = "token";

/// Name of the query parameter appended to the frame URL.
pub const SESSION_ID_PARAM: &str = "sessionId";

/// A connection URL and session id that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConnection {
    url: Url,
    session_id: String,
}

impl ValidatedConnection {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Origin of the connection URL, e.g. `https://connect.data.one`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// URL the embedded frame is loaded from: the connection URL with the
    /// session id appended as a query parameter.
    pub fn frame_src(&self) -> String {
        let mut src = self.url.clone();
        src.query_pairs_mut()
            .append_pair(SESSION_ID_PARAM, &self.session_id);
        src.into()
    }
}

/// Runs the configuration checks in order and returns the first failure.
///
/// # Errors
///
/// See the module documentation for the check order and the variant reported
/// by each step.
///
/// # Example
///
/// ```rust
/// use journey_core::{validate_connection, TrustedOrigins};
///
/// let conn = validate_connection(
///     "https://connect.data.one?token=abc",
///     "session-1",
///     &TrustedOrigins::builtin(),
/// )
/// .unwrap();
/// assert_eq!(conn.origin(), "https://connect.data.one");
/// ```
pub fn validate_connection(
    connection_url: &str,
    session_id: &str,
    origins: &TrustedOrigins,
) -> Result<ValidatedConnection, ConfigError> {
    if connection_url.is_empty() {
        return Err(ConfigError::MissingConnectionUrl);
    }

    if session_id.is_empty() {
        return Err(ConfigError::MissingSessionId);
    }

    let url = Url::parse(connection_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    // Opaque origins (data:, blob: without an inner origin, ...) serialise to
    // "null" and can never be on the list.
    let origin = url.origin().ascii_serialization();
    if !origins.contains(&origin) {
        return Err(ConfigError::UntrustedOrigin { origin });
    }

    let has_token = url
        .query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .is_some_and(|(_, value)| !value.trim().is_empty());
    if !has_token {
        return Err(ConfigError::MissingToken);
    }

    if session_id.trim().is_empty() {
        return Err(ConfigError::BlankSessionId);
    }

    Ok(ValidatedConnection {
        url,
        session_id: session_id.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
