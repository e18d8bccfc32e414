//! Shared helpers for the exported functions
//!
//! Console logging with a `[WASM]` prefix, JS value (de)serialization and
//! conversion of [`EditorError`] into thrown values.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::console;

use crate::error::EditorError;

/// What every exported function returns to JavaScript
pub type ApiResult<T> = Result<T, JsValue>;

/// Debug line in the browser console
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    console::log_1(&format!("[WASM] {}", msg).into());
}

pub fn log_info(msg: &str) {
    console::info_1(&format!("[WASM] {}", msg).into());
}

pub fn log_warn(msg: &str) {
    console::warn_1(&format!("[WASM] ⚠️ {}", msg).into());
}

pub fn log_error(msg: &str) {
    console::error_1(&format!("[WASM] ❌ {}", msg).into());
}

/// Read a JS value into `T`, logging and rethrowing failures
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> ApiResult<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Write `value` as a JS value
///
/// Maps become plain objects so the glue can index edits by id.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> ApiResult<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Log an editor error and turn it into a thrown string
pub fn editor_error(err: EditorError) -> JsValue {
    let msg = err.to_string();
    log_error(&msg);
    JsValue::from_str(&msg)
}

/// Describe a thrown JavaScript value
pub fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
