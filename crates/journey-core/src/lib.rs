//! # journey-core
//!
//! Shared domain types and message rules for the embedded connection journey.
//!
//! The connection journey is a third-party flow that runs inside a sandboxed
//! iframe on a host web page.  The host and the iframe talk to each other with
//! cross-window messages.  This crate holds everything about that conversation
//! that does not need a browser:
//!
//! - **`domain`** – Journey status, the trusted-origin allow-list, connection
//!   URL validation, and the description of the embedded frame.
//!
//! - **`protocol`** – The message envelope (`JourneyEvent`), the inbound
//!   validation rules, and the normalisation of remote error payloads.
//!
//! - **`settings`** – Runtime settings with built-in defaults and an optional
//!   TOML override.
//!
//! The crate has no dependency on DOM bindings, timers, or any event loop.
//! The lifecycle runtime in `journey-embed` builds on top of it.

pub mod domain;
pub mod error;
pub mod protocol;
pub mod settings;

// Re-export the most-used types at the crate root so callers can write
// `journey_core::JourneyEvent` instead of the full module path.
pub use domain::connection::{validate_connection, ValidatedConnection};
pub use domain::frame::{FrameLoading, FrameSpec, SandboxPermission};
pub use domain::origins::TrustedOrigins;
pub use domain::status::JourneyStatus;
pub use error::{ConfigError, HostError, JourneyError};
pub use protocol::failure::{normalize_error, RemoteError};
pub use protocol::messages::{JourneyEvent, JourneyEventType};
pub use protocol::validate::{validate_inbound, Rejection};
pub use settings::{EmbedSettings, SettingsError};
