//! Browser tests for the WASM exports
#![cfg(target_arch = "wasm32")]

use script_pager::wasm::{default_config, engine_version, PaginationEngine};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn init_then_paginate() {
    let mut engine = PaginationEngine::new();
    let reply = engine.handle_message(r#"{"type":"init"}"#);
    assert!(reply.contains("\"success\":true"));

    let reply = engine.handle_message(
        r#"{"type":"paginate","requestId":"w1","elements":[{"id":"a","elementType":"action","content":"Hello."}]}"#,
    );
    assert!(reply.contains("\"requestId\":\"w1\""));
    assert!(reply.contains("\"pageCount\":1"));
}

#[wasm_bindgen_test]
fn structured_messages() {
    let mut engine = PaginationEngine::new();
    let message = js_sys::JSON::parse(r#"{"type":"init"}"#).unwrap();
    let reply = engine.handle_object(message).unwrap();
    let success = js_sys::Reflect::get(&reply, &JsValue::from_str("success")).unwrap();
    assert_eq!(success.as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn exported_queries() {
    assert!(default_config().contains("\"linesPerPage\":55"));
    assert_eq!(engine_version(), env!("CARGO_PKG_VERSION"));
}
