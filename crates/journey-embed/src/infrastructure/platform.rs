//! The seam between the journey lifecycle and the host page.
//!
//! The application layer never touches the DOM directly.  It talks to a
//! [`Platform`] (window messaging, timers, clock) and to the [`Overlay`] the
//! platform creates (modal container plus embedded frame).
//!
//! # Testability
//!
//! The production implementation is `infrastructure::web::WebPlatform`; tests
//! use [`super::mock::MockPlatform`], which records every call and lets a test
//! deliver messages and advance time by hand.

use std::rc::Rc;
use std::time::Duration;

use journey_core::{FrameSpec, HostError};
use serde_json::Value;

/// A message delivered to the host window.
#[derive(Debug, Clone)]
pub struct InboundMessage<W> {
    /// Origin of the sender as reported by the browser.
    pub origin: String,
    /// Window that posted the message, if the browser exposes one.
    pub source: Option<W>,
    /// Message payload converted to JSON.  Payloads that are not
    /// representable as JSON arrive as `Value::Null`.
    pub data: Value,
}

/// Callback registered on the host window for incoming messages.
pub type MessageHandler<W> = Rc<dyn Fn(InboundMessage<W>)>;

/// The modal presentation surface that hosts the journey frame.
pub trait Overlay {
    /// Handle to the embedded frame element.  Cloning yields another handle
    /// to the same element.
    type Frame: Clone + 'static;

    /// Builds the overlay and the frame and attaches them to the page, hidden.
    fn create(&mut self, spec: &FrameSpec) -> Result<(), HostError>;

    /// Makes the overlay visible.
    ///
    /// Fails with [`HostError::OverlayNotCreated`] before `create` or after
    /// `destroy`.
    fn show(&mut self) -> Result<(), HostError>;

    /// Hides the overlay.  A no-op when nothing was created.
    fn hide(&mut self) -> Result<(), HostError>;

    /// Detaches the overlay from the page and releases its elements.
    fn destroy(&mut self);

    fn frame(&self) -> Option<Self::Frame>;

    fn is_visible(&self) -> bool;
}

/// Window messaging, timers and clock of the host page.
pub trait Platform: 'static {
    /// A browsing context that can send and receive messages.  Equality is
    /// identity (the same window), not structural.
    type Window: Clone + PartialEq + 'static;

    type Frame: Clone + 'static;

    type Overlay: Overlay<Frame = Self::Frame> + 'static;

    /// Registration token returned by [`Platform::add_message_listener`].
    type Listener: 'static;

    /// Returns a fresh, not yet created overlay.
    fn new_overlay(&self) -> Self::Overlay;

    /// The frame's content window, or `None` while it is detached.
    fn content_window(&self, frame: &Self::Frame) -> Option<Self::Window>;

    /// Registers `handler` for messages posted to the host window.
    fn add_message_listener(
        &self,
        handler: MessageHandler<Self::Window>,
    ) -> Result<Self::Listener, HostError>;

    /// Deregisters a listener returned by [`Platform::add_message_listener`].
    fn remove_message_listener(&self, listener: Self::Listener);

    /// Posts `message` to `target`, restricted to `target_origin`.
    fn post_message(
        &self,
        target: &Self::Window,
        message: &Value,
        target_origin: &str,
    ) -> Result<(), HostError>;

    /// Runs `task` once after `delay`.  There is no cancellation.
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>);

    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
