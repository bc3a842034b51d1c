//! JavaScript entry points.
//!
//! ```js
//! import { createJourney } from "journey_embed";
//!
//! const journey = createJourney({
//!   connectionUrl: "https://connect.data.one?token=...",
//!   sessionId: "abc-123",
//!   onComplete: (data) => {},
//!   onError: (err) => {},
//!   onExit: () => {},
//! });
//! journey.start();
//! journey.status; // "ready"
//! ```

use js_sys::{Function, Reflect};
use journey_core::JourneyError;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use super::{describe_js, shared_platform, WebPlatform};
use crate::application::config::JourneyConfig;
use crate::application::journey::Journey;

/// Installs the panic hook and routes `tracing` to the browser console.
/// Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = tracing_wasm::try_set_as_global_default();
}

/// The object returned to JavaScript by `createJourney`.
#[wasm_bindgen(js_name = Journey)]
pub struct JsJourney {
    journey: Journey<WebPlatform>,
}

#[wasm_bindgen(js_class = Journey)]
impl JsJourney {
    pub fn start(&self) -> Result<(), JsValue> {
        self.journey.start().map_err(|e| to_js_error(&e))
    }

    pub fn close(&self) {
        self.journey.close();
    }

    pub fn remove(&self) {
        self.journey.remove();
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.journey.status().as_str().to_string()
    }
}

/// Creates a journey from a plain JS config object.
#[wasm_bindgen(js_name = createJourney)]
pub fn create_journey(config: JsValue) -> Result<JsJourney, JsValue> {
    init_logging();

    let platform = shared_platform().map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
    let journey = Journey::new(read_config(&config), platform).map_err(|e| to_js_error(&e))?;
    Ok(JsJourney { journey })
}

fn read_string(object: &JsValue, key: &str) -> String {
    Reflect::get(object, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

fn read_function(object: &JsValue, key: &str) -> Option<Function> {
    Reflect::get(object, &key.into())
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
}

fn to_js_value(value: &Value) -> anyhow::Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| anyhow::anyhow!("cannot convert callback data: {e}"))
}

fn call_failed(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{}", describe_js(&e))
}

/// Converts a journey error to a JS `Error`, keeping the remote error name
/// and details.
fn to_js_error(err: &JourneyError) -> JsValue {
    let js_err = js_sys::Error::new(&err.to_string());
    if let JourneyError::Remote(remote) = err {
        js_err.set_name(&remote.name);
        js_err.set_message(&remote.message);
        if let Some(details) = remote.details.as_ref().and_then(|d| to_js_value(d).ok()) {
            let _ = Reflect::set(&js_err, &"details".into(), &details);
        }
    }
    js_err.into()
}

fn read_config(object: &JsValue) -> JourneyConfig {
    let mut config = JourneyConfig::new(
        read_string(object, "connectionUrl"),
        read_string(object, "sessionId"),
    );

    if let Some(f) = read_function(object, "onComplete") {
        config = config.on_complete(move |data| {
            let arg = match data {
                Some(value) => to_js_value(value)?,
                None => JsValue::UNDEFINED,
            };
            f.call1(&JsValue::NULL, &arg).map_err(call_failed)?;
            Ok(())
        });
    }
    if let Some(f) = read_function(object, "onError") {
        config = config.on_error(move |err| {
            f.call1(&JsValue::NULL, &to_js_error(err)).map_err(call_failed)?;
            Ok(())
        });
    }
    if let Some(f) = read_function(object, "onExit") {
        config = config.on_exit(move || {
            f.call0(&JsValue::NULL).map_err(call_failed)?;
            Ok(())
        });
    }
    config
}
