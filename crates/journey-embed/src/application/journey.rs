//! The journey lifecycle controller.
//!
//! A [`Journey`] owns one overlay and one [`MessageChannel`].  Its state
//! machine is small:
//!
//! ```text
//!  new() ──(valid config, overlay created)──► Ready ─┬─ start() ─► started
//!                                                    │               │
//!                                                    │            close()
//!                                                    │               ▼
//!                                                    └──────────── stopped
//!  remove() = close() + destroy overlay after the teardown delay
//! ```
//!
//! Status never goes back to `Initialising`.  A journey that failed
//! validation is never returned to the caller, so `start()` can only observe
//! `Initialising` through a journey that is still being constructed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::Context;
use journey_core::{
    validate_connection, EmbedSettings, FrameSpec, HostError, JourneyError, JourneyEventType,
    JourneyStatus, ValidatedConnection,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::application::config::{JourneyCallbacks, JourneyConfig};
use crate::application::message_channel::{ChannelHooks, MessageChannel};
use crate::infrastructure::platform::{Overlay, Platform};

struct JourneyInner<P: Platform> {
    connection: ValidatedConnection,
    settings: EmbedSettings,
    platform: Rc<P>,
    callbacks: JourneyCallbacks,
    status: Cell<JourneyStatus>,
    started: Cell<bool>,
    destroyed: Cell<bool>,
    overlay: RefCell<P::Overlay>,
    channel: MessageChannel<P>,
}

/// One embedded connection journey.
pub struct Journey<P: Platform> {
    inner: Rc<JourneyInner<P>>,
}

impl<P: Platform> Journey<P> {
    /// Validates `config` and creates the (hidden) overlay with default
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Config`] when validation fails and
    /// [`JourneyError::Host`] when the overlay cannot be created.  Either
    /// error is also passed to `on_error` before returning.
    pub fn new(config: JourneyConfig, platform: Rc<P>) -> Result<Self, JourneyError> {
        Self::with_settings(config, EmbedSettings::default(), platform)
    }

    /// Like [`Journey::new`] with explicit settings.
    pub fn with_settings(
        config: JourneyConfig,
        settings: EmbedSettings,
        platform: Rc<P>,
    ) -> Result<Self, JourneyError> {
        let JourneyConfig {
            connection_url,
            session_id,
            callbacks,
        } = config;

        let connection =
            match validate_connection(&connection_url, &session_id, &settings.trusted_origins) {
                Ok(connection) => connection,
                Err(e) => return Err(fail_construction(&callbacks, e.into())),
            };

        let spec = FrameSpec::for_connection(
            &connection,
            &settings.trusted_origins,
            &settings.frame_title,
        );
        let mut overlay = platform.new_overlay();
        if let Err(e) = overlay.create(&spec) {
            return Err(fail_construction(&callbacks, e.into()));
        }
        let frame = overlay.frame();

        let inner = Rc::new_cyclic(|weak: &Weak<JourneyInner<P>>| {
            let close_ref = weak.clone();
            let destroy_ref = weak.clone();
            let hooks = ChannelHooks {
                close: Rc::new(move || -> anyhow::Result<()> {
                    close_ref.upgrade().context("journey was dropped")?.close();
                    Ok(())
                }),
                schedule_destroy: Rc::new(move || -> anyhow::Result<()> {
                    destroy_ref
                        .upgrade()
                        .context("journey was dropped")?
                        .schedule_destroy();
                    Ok(())
                }),
            };

            let channel = MessageChannel::new(
                connection.session_id(),
                frame,
                settings.trusted_origins.clone(),
                Rc::clone(&platform),
                callbacks.clone(),
                hooks,
            );

            JourneyInner {
                connection,
                settings,
                platform,
                callbacks,
                status: Cell::new(JourneyStatus::Initialising),
                started: Cell::new(false),
                destroyed: Cell::new(false),
                overlay: RefCell::new(overlay),
                channel,
            }
        });

        inner.status.set(JourneyStatus::Ready);
        info!(
            session_id = %inner.connection.session_id(),
            origin = %inner.connection.origin(),
            "journey ready"
        );
        Ok(Self { inner })
    }

    /// Shows the overlay and starts listening for journey messages.
    ///
    /// Calling `start()` on a started journey logs a warning and succeeds.
    ///
    /// # Errors
    ///
    /// [`JourneyError::NotReady`] if the journey is not ready, without
    /// calling `on_error`.  Host failures while showing or listening are
    /// passed to `on_error` and returned.
    pub fn start(&self) -> Result<(), JourneyError> {
        let inner = &self.inner;
        let status = inner.status.get();
        if !status.is_ready() {
            return Err(JourneyError::NotReady { status });
        }
        if inner.started.get() {
            warn!("Journey is already started");
            return Ok(());
        }

        if let Err(e) = inner.open() {
            let err = JourneyError::Host(e);
            error!("error starting journey: {err}");
            inner.callbacks.error(&err);
            return Err(err);
        }

        inner.started.set(true);
        info!(session_id = %inner.connection.session_id(), "journey started");
        Ok(())
    }

    /// Stops listening and hides the overlay.  Safe to call repeatedly.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Closes the journey and destroys the overlay after the teardown delay.
    pub fn remove(&self) {
        self.inner.close();
        self.inner.schedule_destroy();
    }

    /// Posts an event to the journey frame.
    pub fn send_message(&self, event_type: JourneyEventType, data: Option<Value>) {
        match self.frame() {
            Some(frame) => self.inner.channel.send_message(&frame, event_type, data),
            None => warn!("cannot send message, journey iframe not available"),
        }
    }

    pub fn status(&self) -> JourneyStatus {
        self.inner.status.get()
    }

    pub fn session_id(&self) -> &str {
        self.inner.connection.session_id()
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Whether the overlay is currently shown.
    pub fn is_visible(&self) -> bool {
        self.inner
            .overlay
            .try_borrow()
            .map(|overlay| overlay.is_visible())
            .unwrap_or(false)
    }

    /// The embedded frame, or `None` once the overlay is destroyed.
    pub fn frame(&self) -> Option<P::Frame> {
        self.inner
            .overlay
            .try_borrow()
            .ok()
            .and_then(|overlay| overlay.frame())
    }

    pub fn channel(&self) -> &MessageChannel<P> {
        &self.inner.channel
    }
}

impl<P: Platform> JourneyInner<P> {
    fn open(&self) -> Result<(), HostError> {
        {
            let mut overlay = self
                .overlay
                .try_borrow_mut()
                .map_err(|_| HostError::Dom("overlay is busy".to_string()))?;
            overlay.show()?;
        }
        self.channel.start_listening()
    }

    fn close(&self) {
        self.channel.stop_listening();

        match self.overlay.try_borrow_mut() {
            Ok(mut overlay) => {
                if let Err(e) = overlay.hide() {
                    error!("error closing journey: {e}");
                }
            }
            Err(_) => error!("error closing journey: overlay is busy"),
        }

        if self.started.replace(false) {
            debug!(session_id = %self.connection.session_id(), "journey closed");
        }
    }

    fn schedule_destroy(self: &Rc<Self>) {
        let this = Rc::clone(self);
        let delay = self.settings.teardown_delay();
        self.platform
            .set_timeout(delay, Box::new(move || this.destroy_overlay()));
        debug!(delay_ms = delay.as_millis() as u64, "overlay teardown scheduled");
    }

    fn destroy_overlay(&self) {
        if self.destroyed.get() {
            return;
        }
        match self.overlay.try_borrow_mut() {
            Ok(mut overlay) => {
                overlay.destroy();
                self.destroyed.set(true);
                debug!(session_id = %self.connection.session_id(), "overlay destroyed");
            }
            Err(_) => error!("error destroying overlay: overlay is busy"),
        }
    }
}

/// Logs a construction failure and forwards it to `on_error`.
fn fail_construction(callbacks: &JourneyCallbacks, err: JourneyError) -> JourneyError {
    error!("journey configuration rejected: {err}");
    callbacks.error(&err);
    err
}

// ── Tests ─────────────────────────────────────────────────────────────────────
