//! The trusted-origin allow-list.
//!
//! Every inbound message must come from one of these origins, every outbound
//! message is addressed to the first of them, and the connection URL must be
//! served from one of them.  Origins are compared as exact ASCII
//! serialisations (`scheme://host[:port]`), the same form a browser reports in
//! `MessageEvent.origin`.

use serde::{Deserialize, Serialize};

/// Origins compiled into the crate.
///
/// The first entry is the production journey host and is used as the target
/// origin of outbound messages.
pub const BUILTIN_TRUSTED_ORIGINS: &[&str] =
    &["https://connect.data.one", "https://connect.staging.data.one"];

/// An ordered, non-empty list of trusted origins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TrustedOrigins {
    origins: Vec<String>,
}

impl TrustedOrigins {
    /// Builds an allow-list from arbitrary origin strings.
    ///
    /// Surrounding whitespace and a trailing `/` are stripped so that
    /// `"https://connect.data.one/"` matches the browser-reported origin.
    /// Returns `None` when the list is empty after normalisation.
    pub fn new<I, S>(origins: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            None
        } else {
            Some(Self { origins })
        }
    }

    /// The compiled-in allow-list.
    pub fn builtin() -> Self {
        Self {
            origins: BUILTIN_TRUSTED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// Returns `true` if `origin` is an exact member of the list.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Target origin for outbound messages.
    pub fn primary(&self) -> &str {
        // Non-emptiness is enforced by every constructor.
        &self.origins[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Value of the iframe `allow` attribute derived from the list.
    pub fn permissions_policy(&self) -> String {
        self.origins.join(" ")
    }
}

impl Default for TrustedOrigins {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<String>> for TrustedOrigins {
    type Error = &'static str;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("trusted origin list must not be empty")
    }
}

impl From<TrustedOrigins> for Vec<String> {
    fn from(value: TrustedOrigins) -> Self {
        value.origins
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_primary_is_production_host() {
        assert_eq!(TrustedOrigins::builtin().primary(), "https://connect.data.one");
    }

    #[test]
    fn test_contains_requires_exact_match() {
        // Arrange
        let origins = TrustedOrigins::builtin();

        // Assert
        assert!(origins.contains("https://connect.data.one"));
        assert!(!origins.contains("http://connect.data.one"));
        assert!(!origins.contains("https://connect.data.one.evil.example"));
        assert!(!origins.contains("https://connect.data.one:8443"));
    }

    #[test]
    fn test_new_normalises_trailing_slash_and_whitespace() {
        let origins = TrustedOrigins::new([" https://a.example/ ", "https://b.example"]).unwrap();
        assert!(origins.contains("https://a.example"));
        assert_eq!(origins.primary(), "https://a.example");
    }

    #[test]
    fn test_new_rejects_empty_list() {
        assert!(TrustedOrigins::new(Vec::<String>::new()).is_none());
        assert!(TrustedOrigins::new(["  ", "/"]).is_none());
    }

    #[test]
    fn test_permissions_policy_joins_with_spaces() {
        let origins = TrustedOrigins::new(["https://a.example", "https://b.example"]).unwrap();
        assert_eq!(origins.permissions_policy(), "https://a.example https://b.example");
    }

    #[test]
    fn test_deserialize_rejects_empty_array() {
        let result: Result<TrustedOrigins, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }
}
