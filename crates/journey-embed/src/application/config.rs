//! Journey configuration supplied by the host page.
//!
//! Callbacks return `anyhow::Result<()>`.  An `Err` is logged and otherwise
//! ignored: a failing callback must never leave the journey half closed or
//! escape into the page's event dispatch.

use std::fmt;
use std::rc::Rc;

use journey_core::JourneyError;
use serde_json::Value;
use tracing::error;

/// Called with the `data` of a `complete` event.
pub type CompleteCallback = Rc<dyn Fn(Option<&Value>) -> anyhow::Result<()>>;

/// Called with configuration, start-up, and remote errors.
pub type ErrorCallback = Rc<dyn Fn(&JourneyError) -> anyhow::Result<()>>;

/// Called when the user leaves the journey.
pub type ExitCallback = Rc<dyn Fn() -> anyhow::Result<()>>;

/// The optional host callbacks.  Cloning shares the same closures.
#[derive(Clone, Default)]
pub struct JourneyCallbacks {
    pub on_complete: Option<CompleteCallback>,
    pub on_error: Option<ErrorCallback>,
    pub on_exit: Option<ExitCallback>,
}

impl JourneyCallbacks {
    pub(crate) fn complete(&self, data: Option<&Value>) {
        if let Some(callback) = &self.on_complete {
            if let Err(e) = callback(data) {
                error!("error in onComplete callback: {e:#}");
            }
        }
    }

    pub(crate) fn error(&self, err: &JourneyError) {
        if let Some(callback) = &self.on_error {
            if let Err(e) = callback(err) {
                error!("error in onError callback: {e:#}");
            }
        }
    }

    pub(crate) fn exit(&self) {
        if let Some(callback) = &self.on_exit {
            if let Err(e) = callback() {
                error!("error in onExit callback: {e:#}");
            }
        }
    }
}

impl fmt::Debug for JourneyCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JourneyCallbacks")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// Everything needed to construct a journey.
///
/// An empty string stands for a missing value, so `connection_url: ""` fails
/// with `connectionUrl is required`.
///
/// # Example
///
/// ```rust
/// use journey_embed::JourneyConfig;
///
/// let config = JourneyConfig::new("https://connect.data.one?token=abc", "session-1")
///     .on_complete(|data| {
///         println!("journey finished: {data:?}");
///         Ok(())
///     })
///     .on_exit(|| Ok(()));
/// assert_eq!(config.session_id, "session-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JourneyConfig {
    /// Backend-issued URL of the journey; must carry a `token` parameter.
    pub connection_url: String,
    pub session_id: String,
    pub callbacks: JourneyCallbacks,
}

impl JourneyConfig {
    pub fn new(connection_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            connection_url: connection_url.into(),
            session_id: session_id.into(),
            callbacks: JourneyCallbacks::default(),
        }
    }

    pub fn on_complete(
        mut self,
        callback: impl Fn(Option<&Value>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.callbacks.on_complete = Some(Rc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&JourneyError) -> anyhow::Result<()> + 'static) -> Self {
        self.callbacks.on_error = Some(Rc::new(callback));
        self
    }

    pub fn on_exit(mut self, callback: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        self.callbacks.on_exit = Some(Rc::new(callback));
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_builder_sets_callbacks() {
        let config = JourneyConfig::new("u", "s")
            .on_complete(|_| Ok(()))
            .on_exit(|| Ok(()));

        assert!(config.callbacks.on_complete.is_some());
        assert!(config.callbacks.on_error.is_none());
        assert!(config.callbacks.on_exit.is_some());
    }

    #[test]
    fn test_failing_callback_is_swallowed() {
        // Arrange
        let calls = Rc::new(Cell::new(0));
        let calls_in_cb = Rc::clone(&calls);
        let config = JourneyConfig::new("u", "s").on_exit(move || {
            calls_in_cb.set(calls_in_cb.get() + 1);
            anyhow::bail!("host page handler failed")
        });

        // Act – must not panic or propagate
        config.callbacks.exit();

        // Assert
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_missing_callbacks_are_no_ops() {
        let callbacks = JourneyCallbacks::default();
        callbacks.complete(None);
        callbacks.exit();
        callbacks.error(&JourneyError::NotReady {
            status: journey_core::JourneyStatus::Initialising,
        });
    }

    #[test]
    fn test_debug_does_not_require_debug_closures() {
        let config = JourneyConfig::new("u", "s").on_error(|_| Ok(()));
        let text = format!("{config:?}");
        assert!(text.contains("on_error: true"));
    }
}
