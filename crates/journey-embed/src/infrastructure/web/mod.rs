//! Browser backend, compiled for `wasm32` only.
//!
//! - [`WebPlatform`] – window messaging, timers and clock over `web-sys`.
//! - [`overlay::DomOverlay`] – the modal overlay and iframe in the page DOM.
//! - [`bindings`] – the `createJourney` export for JavaScript callers.

pub mod bindings;
pub mod overlay;

use std::rc::Rc;
use std::time::Duration;

use journey_core::HostError;
use js_sys::{Function, Object};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlIFrameElement, MessageEvent, Window};

use self::overlay::DomOverlay;
use super::platform::{InboundMessage, MessageHandler, Platform};

/// Formats a thrown JS value for an error message.
pub(crate) fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// A registered `message` listener.  Dropping it without
/// [`Platform::remove_message_listener`] leaves a dangling callback in the
/// page, so the channel always hands it back.
pub struct WebListener {
    closure: Closure<dyn FnMut(MessageEvent)>,
}

/// The host page's `window`.
pub struct WebPlatform {
    window: Window,
    document: Document,
}

impl WebPlatform {
    /// Binds to the global `window` and its document.
    pub fn new() -> Result<Self, HostError> {
        let window =
            web_sys::window().ok_or_else(|| HostError::Dom("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::Dom("window has no document".to_string()))?;
        Ok(Self { window, document })
    }
}

impl Platform for WebPlatform {
    /// Message sources arrive as plain objects; compared by identity.
    type Window = Object;
    type Frame = HtmlIFrameElement;
    type Overlay = DomOverlay;
    type Listener = WebListener;

    fn new_overlay(&self) -> DomOverlay {
        DomOverlay::new(self.window.clone(), self.document.clone())
    }

    fn content_window(&self, frame: &HtmlIFrameElement) -> Option<Object> {
        frame.content_window().map(|w| w.unchecked_into::<Object>())
    }

    fn add_message_listener(
        &self,
        handler: MessageHandler<Object>,
    ) -> Result<WebListener, HostError> {
        let closure = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let data = serde_wasm_bindgen::from_value::<Value>(event.data()).unwrap_or(Value::Null);
            handler(InboundMessage {
                origin: event.origin(),
                source: event.source(),
                data,
            });
        });

        self.window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Messaging(describe_js(&e)))?;
        Ok(WebListener { closure })
    }

    fn remove_message_listener(&self, listener: WebListener) {
        if let Err(e) = self.window.remove_event_listener_with_callback(
            "message",
            listener.closure.as_ref().unchecked_ref(),
        ) {
            warn!("failed to remove message listener: {}", describe_js(&e));
        }
    }

    fn post_message(
        &self,
        target: &Object,
        message: &Value,
        target_origin: &str,
    ) -> Result<(), HostError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let payload = message
            .serialize(&serializer)
            .map_err(|e| HostError::Messaging(e.to_string()))?;

        target
            .unchecked_ref::<Window>()
            .post_message(&payload, target_origin)
            .map_err(|e| HostError::Messaging(describe_js(&e)))
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref::<Function>(),
                millis,
            )
        {
            warn!("setTimeout failed: {}", describe_js(&e));
        }
    }

    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

/// Shared handle used by the JS bindings.
pub(crate) fn shared_platform() -> Result<Rc<WebPlatform>, HostError> {
    WebPlatform::new().map(Rc::new)
}
