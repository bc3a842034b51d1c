//! The journey overlay as real DOM.
//!
//! ```text
//! body
//!  └── div[data-dataone-overlay]          full-screen dimmed backdrop
//!       └── div (container)               white rounded card
//!            ├── div (spinner)            removed once the frame loads
//!            ├── div "Loading..."         removed once the frame loads
//!            └── iframe#dataone-iframe-<session>
//! ```
//!
//! The backdrop starts transparent behind the page (`z-index: -1`).  Showing
//! it raises it above everything and locks body scrolling; hiding and
//! destroying restore the body's original `overflow`.

use std::time::Duration;

use journey_core::{FrameSpec, HostError};
use tracing::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, Window};

use super::describe_js;
use crate::infrastructure::platform::Overlay;

const SPINNER_STYLE_MARKER: &str = "data-dataone-spinner";
const OVERLAY_MARKER: &str = "data-dataone-overlay";

/// Spinner and text fade out over this long before being removed.
const SPINNER_FADE: Duration = Duration::from_millis(300);

const SPINNER_KEYFRAMES: &str = "
  @keyframes spin {
    0% { transform: rotate(0deg); }
    100% { transform: rotate(360deg); }
  }
";

const OVERLAY_STYLES: &str = "
  position: fixed; top: 0; left: 0; width: 100%; height: 100%;
  background-color: rgba(0, 0, 0, 0.7);
  display: flex; align-items: center; justify-content: center;
  opacity: 0; transition: opacity 0.3s ease-in-out;
  pointer-events: auto; z-index: -1;
";

const CONTAINER_STYLES: &str = "
  position: relative;
  display: flex; flex-direction: column; align-items: center; justify-content: center;
  width: 90%; max-width: 440px; height: 90%; max-height: 640px;
  background-color: white; border-radius: 16px;
";

const SPINNER_STYLES: &str = "
  width: 40px; height: 40px;
  border: 4px solid #f3f3f3; border-top: 4px solid #263648; border-radius: 50%;
  animation: spin 1s linear infinite;
  opacity: 1; transition: opacity 0.3s ease-in-out;
";

const LOADING_TEXT_STYLES: &str = "
  margin-top: 16px;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  font-size: 16px; color: #666;
  opacity: 1; transition: opacity 0.3s ease-in-out;
";

const IFRAME_STYLES: &str = "
  width: 100%; height: 100%; border: none;
  transition: opacity 0.3s ease-in-out 0.15s; opacity: 0;
  position: absolute; top: 0; left: 0; border-radius: 16px;
";

fn dom_err(e: JsValue) -> HostError {
    HostError::Dom(describe_js(&e))
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, HostError> {
    document
        .create_element(tag)
        .map_err(dom_err)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| HostError::Dom(format!("<{tag}> is not an HTML element")))
}

fn set_style(element: &HtmlElement, property: &str, value: &str) -> Result<(), HostError> {
    element.style().set_property(property, value).map_err(dom_err)
}

/// Elements that exist between `create` and `destroy`.
struct Mounted {
    backdrop: HtmlElement,
    frame: HtmlIFrameElement,
    // Held so the browser callbacks stay alive as long as the frame.
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

/// [`Overlay`] backed by the page DOM.
pub struct DomOverlay {
    window: Window,
    document: Document,
    mounted: Option<Mounted>,
    spinner_style: Option<Element>,
    body_overflow: String,
    visible: bool,
}

impl DomOverlay {
    pub(crate) fn new(window: Window, document: Document) -> Self {
        let body_overflow = document
            .body()
            .and_then(|body| body.style().get_property_value("overflow").ok())
            .unwrap_or_default();

        Self {
            window,
            document,
            mounted: None,
            spinner_style: None,
            body_overflow,
            visible: false,
        }
    }

    fn body(&self) -> Result<HtmlElement, HostError> {
        self.document
            .body()
            .ok_or_else(|| HostError::Dom("document has no body".to_string()))
    }

    fn set_body_overflow(&self, value: &str) {
        let result = self.body().and_then(|body| set_style(&body, "overflow", value));
        if let Err(e) = result {
            error!("failed to update body scroll: {e}");
        }
    }

    /// Adds the spinner keyframes to `<head>` once per page.
    fn inject_spinner_keyframes(&mut self) -> Result<(), HostError> {
        let selector = format!("style[{SPINNER_STYLE_MARKER}]");
        if self.document.query_selector(&selector).map_err(dom_err)?.is_some() {
            return Ok(());
        }

        let head = self
            .document
            .head()
            .ok_or_else(|| HostError::Dom("document has no head".to_string()))?;
        let style = self.document.create_element("style").map_err(dom_err)?;
        style.set_attribute(SPINNER_STYLE_MARKER, "true").map_err(dom_err)?;
        style.set_text_content(Some(SPINNER_KEYFRAMES));
        head.append_child(&style).map_err(dom_err)?;
        self.spinner_style = Some(style);
        Ok(())
    }

    fn build_frame(&self, spec: &FrameSpec) -> Result<HtmlIFrameElement, HostError> {
        let frame = self
            .document
            .create_element("iframe")
            .map_err(dom_err)?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| HostError::Dom("<iframe> is not an iframe element".to_string()))?;

        frame.style().set_css_text(IFRAME_STYLES);
        frame.set_id(&spec.id);
        frame.set_src(&spec.src);
        frame.set_title(&spec.title);
        frame
            .set_attribute("data-session-id", &spec.session_id)
            .map_err(dom_err)?;
        frame
            .set_attribute("sandbox", &spec.sandbox_attribute())
            .map_err(dom_err)?;
        frame.set_attribute("allow", &spec.allow).map_err(dom_err)?;
        frame
            .set_attribute("loading", spec.loading.as_str())
            .map_err(dom_err)?;
        Ok(frame)
    }
}

impl Overlay for DomOverlay {
    type Frame = HtmlIFrameElement;

    fn create(&mut self, spec: &FrameSpec) -> Result<(), HostError> {
        self.inject_spinner_keyframes()?;

        let backdrop = create_html(&self.document, "div")?;
        backdrop.style().set_css_text(OVERLAY_STYLES);
        backdrop.set_attribute(OVERLAY_MARKER, "true").map_err(dom_err)?;

        let container = create_html(&self.document, "div")?;
        container.style().set_css_text(CONTAINER_STYLES);

        let spinner = create_html(&self.document, "div")?;
        spinner.style().set_css_text(SPINNER_STYLES);

        let loading_text = create_html(&self.document, "div")?;
        loading_text.set_text_content(Some("Loading..."));
        loading_text.style().set_css_text(LOADING_TEXT_STYLES);

        let frame = self.build_frame(spec)?;

        container.append_child(&spinner).map_err(dom_err)?;
        container.append_child(&loading_text).map_err(dom_err)?;

        let on_load = {
            let window = self.window.clone();
            let frame = frame.clone();
            let (spinner, loading_text) = (spinner.clone(), loading_text.clone());
            Closure::<dyn FnMut()>::new(move || {
                let _ = set_style(&frame, "opacity", "1");
                let _ = set_style(&spinner, "opacity", "0");
                let _ = set_style(&loading_text, "opacity", "0");

                let (spinner, loading_text) = (spinner.clone(), loading_text.clone());
                let remove = Closure::once_into_js(move || {
                    spinner.remove();
                    loading_text.remove();
                });
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    remove.unchecked_ref(),
                    SPINNER_FADE.as_millis() as i32,
                );
                debug!("journey iframe loaded");
            })
        };
        let on_error = Closure::<dyn FnMut()>::new(|| {
            error!("{}", HostError::FrameLoadFailed);
        });
        frame
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        frame
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(dom_err)?;

        container.append_child(&frame).map_err(dom_err)?;
        backdrop.append_child(&container).map_err(dom_err)?;
        self.body()?.append_child(&backdrop).map_err(dom_err)?;

        self.mounted = Some(Mounted {
            backdrop,
            frame,
            _on_load: on_load,
            _on_error: on_error,
        });
        Ok(())
    }

    fn show(&mut self) -> Result<(), HostError> {
        let mounted = self.mounted.as_ref().ok_or(HostError::OverlayNotCreated)?;
        set_style(&mounted.backdrop, "opacity", "1")?;
        set_style(&mounted.backdrop, "z-index", "2147483647")?;
        set_style(&mounted.backdrop, "pointer-events", "auto")?;
        self.visible = true;
        self.set_body_overflow("hidden");
        Ok(())
    }

    fn hide(&mut self) -> Result<(), HostError> {
        let Some(mounted) = self.mounted.as_ref() else {
            return Ok(());
        };
        set_style(&mounted.backdrop, "opacity", "0")?;
        set_style(&mounted.backdrop, "z-index", "-1")?;
        set_style(&mounted.backdrop, "pointer-events", "none")?;
        self.visible = false;
        self.set_body_overflow(&self.body_overflow);
        Ok(())
    }

    fn destroy(&mut self) {
        self.set_body_overflow(&self.body_overflow);
        if let Some(mounted) = self.mounted.take() {
            mounted.backdrop.remove();
        }
        if let Some(style) = self.spinner_style.take() {
            style.remove();
        }
        self.visible = false;
    }

    fn frame(&self) -> Option<HtmlIFrameElement> {
        self.mounted.as_ref().map(|mounted| mounted.frame.clone())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
