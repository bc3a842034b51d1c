//! Message channel between the host page and the journey frame.
//!
//! Inbound, the channel listens on the host window, validates every message
//! with [`journey_core::validate_inbound`], and dispatches accepted events to
//! the host callbacks.  Outbound, it wraps host data in a [`JourneyEvent`]
//! envelope and posts it to the frame.
//!
//! # Dispatch
//!
//! ```text
//! complete ──► on_complete(data) ──► close() ──► destroy overlay after delay
//! error    ──► on_error(normalised RemoteError)
//! exit     ──► on_exit()          ──► close()
//! ```
//!
//! # Ownership
//!
//! The journey owns the channel.  The channel keeps a clone of the frame
//! handle for source checks and two hooks back into the journey (`close` and
//! `schedule_destroy`).  The hooks hold weak references, and the listener
//! registered on the window holds a weak reference to the channel, so no
//! reference cycle keeps a dropped journey alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::Context;
use journey_core::{
    normalize_error, validate_inbound, JourneyError, JourneyEvent, JourneyEventType,
    TrustedOrigins,
};
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::application::config::JourneyCallbacks;
use crate::infrastructure::platform::{InboundMessage, MessageHandler, Platform};

/// A hook from the channel back into its owner.
pub type LifecycleHook = Rc<dyn Fn() -> anyhow::Result<()>>;

/// Lifecycle actions the channel can trigger on its owner.
#[derive(Clone)]
pub struct ChannelHooks {
    /// Stop listening and hide the overlay.
    pub close: LifecycleHook,
    /// Destroy the overlay after the teardown delay.
    pub schedule_destroy: LifecycleHook,
}

impl ChannelHooks {
    /// Hooks that do nothing; for a channel used without a journey.
    pub fn detached() -> Self {
        let noop: LifecycleHook = Rc::new(|| Ok(()));
        Self {
            close: Rc::clone(&noop),
            schedule_destroy: noop,
        }
    }
}

struct ChannelInner<P: Platform> {
    session_id: String,
    origins: TrustedOrigins,
    frame: Option<P::Frame>,
    platform: Rc<P>,
    callbacks: JourneyCallbacks,
    hooks: ChannelHooks,
    listener: RefCell<Option<P::Listener>>,
}

/// Validates, relays and sends journey messages for one session.
pub struct MessageChannel<P: Platform> {
    inner: Rc<ChannelInner<P>>,
}

impl<P: Platform> MessageChannel<P> {
    /// Creates a channel for `session_id`.
    ///
    /// When `frame` is `Some`, inbound messages must come from that frame's
    /// content window.
    pub fn new(
        session_id: impl Into<String>,
        frame: Option<P::Frame>,
        origins: TrustedOrigins,
        platform: Rc<P>,
        callbacks: JourneyCallbacks,
        hooks: ChannelHooks,
    ) -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                session_id: session_id.into(),
                origins,
                frame,
                platform,
                callbacks,
                hooks,
                listener: RefCell::new(None),
            }),
        }
    }

    /// Registers the window message listener.  A no-op if already listening.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the listener cannot be registered.
    pub fn start_listening(&self) -> Result<(), journey_core::HostError> {
        if self.inner.listener.borrow().is_some() {
            return Ok(());
        }

        let weak: Weak<ChannelInner<P>> = Rc::downgrade(&self.inner);
        let handler: MessageHandler<P::Window> = Rc::new(move |message| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_message(message);
            }
        });

        let listener = self.inner.platform.add_message_listener(handler)?;
        *self.inner.listener.borrow_mut() = Some(listener);
        debug!(session_id = %self.inner.session_id, "message listener registered");
        Ok(())
    }

    /// Deregisters the listener.  A no-op if not listening.
    pub fn stop_listening(&self) {
        self.inner.stop_listening();
    }

    pub fn is_listening(&self) -> bool {
        self.inner.listener.borrow().is_some()
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Posts a `type` event with optional `data` to `frame`.
    ///
    /// The envelope is stamped with this channel's session id and the current
    /// time, and addressed to the primary trusted origin.  A frame without a
    /// content window, or a failing post, is logged and otherwise ignored.
    pub fn send_message(&self, frame: &P::Frame, event_type: JourneyEventType, data: Option<Value>) {
        let inner = &self.inner;
        let Some(window) = inner.platform.content_window(frame) else {
            warn!("cannot send message, iframe content window not available");
            return;
        };

        let event = JourneyEvent::new(
            event_type,
            inner.session_id.clone(),
            data,
            inner.platform.now_millis(),
        );

        match inner
            .platform
            .post_message(&window, &event.to_value(), inner.origins.primary())
        {
            Ok(()) => debug!(event = %event_type, "message sent to journey frame"),
            Err(e) => error!("error sending message to iframe: {e}"),
        }
    }
}

impl<P: Platform> ChannelInner<P> {
    fn stop_listening(&self) {
        // Release the borrow before calling into the platform.
        let listener = self.listener.borrow_mut().take();
        if let Some(listener) = listener {
            self.platform.remove_message_listener(listener);
            debug!(session_id = %self.session_id, "message listener removed");
        }
    }

    /// Entry point for every message posted to the host window.
    fn handle_message(&self, message: InboundMessage<P::Window>) {
        if let Err(e) = self.process(message) {
            warn!("error processing journey message: {e:#}");
        }
    }

    fn process(&self, message: InboundMessage<P::Window>) -> anyhow::Result<()> {
        let source_matches = self.source_matches(message.source.as_ref());

        let event = match validate_inbound(
            &message.origin,
            source_matches,
            &message.data,
            &self.session_id,
            &self.origins,
        ) {
            Ok(event) => event,
            Err(rejection) => {
                trace!(origin = %message.origin, %rejection, "ignoring window message");
                return Ok(());
            }
        };

        debug!(event = %event.event_type, timestamp = event.timestamp, "journey event received");
        self.dispatch(event)
    }

    fn source_matches(&self, source: Option<&P::Window>) -> bool {
        match &self.frame {
            None => true,
            Some(frame) => source == self.platform.content_window(frame).as_ref(),
        }
    }

    fn dispatch(&self, event: JourneyEvent) -> anyhow::Result<()> {
        match event.event_type {
            JourneyEventType::Complete => {
                self.callbacks.complete(event.data.as_ref());
                (self.hooks.close)().context("closing journey after complete")?;
                (self.hooks.schedule_destroy)().context("scheduling overlay teardown")?;
            }
            JourneyEventType::Error => {
                let remote = normalize_error(event.data.as_ref());
                self.callbacks.error(&JourneyError::Remote(remote));
            }
            JourneyEventType::Exit => {
                self.callbacks.exit();
                (self.hooks.close)().context("closing journey after exit")?;
            }
        }
        Ok(())
    }
}

impl<P: Platform> Drop for ChannelInner<P> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            self.platform.remove_message_listener(listener);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
