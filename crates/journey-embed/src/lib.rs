//! journey-embed library crate.
//!
//! Embeds the connection journey in a host web page: a modal overlay with a
//! sandboxed iframe, and a message channel that relays the journey's
//! `complete` / `error` / `exit` events to the page's callbacks.
//!
//! # Architecture
//!
//! ```text
//! Host page (callbacks, createJourney)
//!         ↕
//! [journey-embed]
//!   ├── application/      Journey lifecycle, MessageChannel, create_journey façade
//!   └── infrastructure/
//!         ├── platform    Platform + Overlay traits (the seam to the browser)
//!         ├── mock        In-memory host page for tests
//!         └── web         wasm32 only: DOM overlay, window messaging, JS bindings
//!         ↕
//! Journey iframe  (JSON envelopes over window.postMessage)
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `journey-core` and the `infrastructure::platform`
//!   traits only; it never names a browser type.
//! - `infrastructure::web` is the only module that touches `web-sys`.
//!
//! # Threading
//!
//! Everything runs on the page's event-loop thread.  Shared state is held in
//! `Rc`, `Cell` and `RefCell`; nothing here is `Send`.

/// Application layer: journey lifecycle and message channel.
pub mod application;

/// Infrastructure layer: platform traits and their implementations.
pub mod infrastructure;

pub use application::config::{JourneyCallbacks, JourneyConfig};
pub use application::facade::{create_journey, create_journey_with_settings, JourneyHandle};
pub use application::journey::Journey;
pub use application::message_channel::MessageChannel;
pub use infrastructure::platform::{InboundMessage, MessageHandler, Overlay, Platform};
pub use journey_core::{
    EmbedSettings, HostError, JourneyError, JourneyEvent, JourneyEventType, JourneyStatus,
    RemoteError,
};
