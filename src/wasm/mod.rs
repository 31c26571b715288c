//! WASM bindings for the pagination engine
//!
//! Meant to run inside a Web Worker: the worker script forwards every
//! `postMessage` payload to `handleMessage` and posts the reply back.

use crate::protocol::Engine;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed engine wrapper
#[wasm_bindgen]
pub struct PaginationEngine {
    engine: Engine,
}

#[wasm_bindgen]
impl PaginationEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }

    /// Handle one JSON message and return the JSON response
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, message: &str) -> String {
        self.engine.handle_json(message)
    }

    /// Same as `handleMessage` for structured-clone payloads
    #[wasm_bindgen(js_name = handleObject)]
    pub fn handle_object(&mut self, message: JsValue) -> Result<JsValue, JsValue> {
        let text = match message.as_string() {
            Some(text) => text,
            None => js_sys::JSON::stringify(&message)?.into(),
        };
        let reply = self.engine.handle_json(&text);
        js_sys::JSON::parse(&reply)
    }

    #[wasm_bindgen(js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.engine.is_initialized()
    }
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The Feature Film preset as JSON
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> String {
    serde_json::to_string(&crate::default_config()).unwrap_or_else(|_| "{}".to_string())
}

#[wasm_bindgen(js_name = engineVersion)]
pub fn engine_version() -> String {
    crate::version().to_string()
}
