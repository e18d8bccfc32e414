//! Calls to the score service
//!
//! Thin `fetch` wrappers; request bodies and response validation live in
//! [`crate::render`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::models::EditMap;
use crate::render::requests::{
    ApplyEditsRequest, APPLY_EDITS_XML, EXPORT_MIDI, EXPORT_XML, RENDER_XML, VALIDATE_CHORD, VALIDATE_NOTE,
};
use crate::render::{MidiExportRequest, ProgramRequest, RenderResponse, ValidateRequest, ValidateResponse};

use super::helpers::js_message;

fn network_error(value: JsValue) -> EditorError {
    EditorError::Network(js_message(&value))
}

/// POST a JSON body and wait for the response headers
async fn post_json<T: Serialize>(url: &str, body: &T) -> Result<Response> {
    let json = serde_json::to_string(body)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&json));

    let request = Request::new_with_str_and_init(url, &opts).map_err(network_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(network_error)?;

    let window = web_sys::window().ok_or_else(|| EditorError::Network("no window".to_string()))?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    value.dyn_into::<Response>().map_err(network_error)
}

async fn response_text(response: &Response) -> Result<String> {
    let promise = response.text().map_err(network_error)?;
    let value = JsFuture::from(promise).await.map_err(network_error)?;
    Ok(value.as_string().unwrap_or_default())
}

/// Body of a 2xx answer, or a server error carrying it
async fn checked_text(response: &Response) -> Result<String> {
    let body = response_text(response).await?;
    if !response.ok() {
        let message = if body.trim().is_empty() { "server error".to_string() } else { body };
        return Err(EditorError::Server {
            status: response.status(),
            message,
        });
    }
    Ok(body)
}

async fn post_for_json<T: Serialize, R: DeserializeOwned>(url: &str, body: &T) -> Result<R> {
    let response = post_json(url, body).await?;
    let text = checked_text(&response).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Run the program on the service and return the validated MusicXML
pub async fn render_program(config: &EditorConfig, code: &str) -> Result<RenderResponse> {
    let url = config.endpoint(RENDER_XML);
    log::debug!("network: POST {} ({} bytes of code)", url, code.len());
    let response = post_json(&url, &ProgramRequest::new(code)).await?;
    let body = response_text(&response).await?;
    let headers = response.headers();
    RenderResponse::from_parts(response.status(), &body, |name| headers.get(name).ok().flatten())
}

/// MusicXML for download
pub async fn export_xml(config: &EditorConfig, code: &str) -> Result<String> {
    let response = post_json(&config.endpoint(EXPORT_XML), &ProgramRequest::new(code)).await?;
    checked_text(&response).await
}

/// Standard MIDI file bytes
pub async fn export_midi(config: &EditorConfig, request: &MidiExportRequest) -> Result<Vec<u8>> {
    let response = post_json(&config.endpoint(EXPORT_MIDI), request).await?;
    if !response.ok() {
        let message = response_text(&response).await?;
        return Err(EditorError::Server {
            status: response.status(),
            message,
        });
    }
    let promise = response.array_buffer().map_err(network_error)?;
    let buffer = JsFuture::from(promise).await.map_err(network_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    log::info!("network: received {} byte(s) of MIDI", bytes.len());
    Ok(bytes)
}

pub async fn validate_chord(config: &EditorConfig, text: &str) -> Result<ValidateResponse> {
    let body = ValidateRequest { text: text.to_string() };
    post_for_json(&config.endpoint(VALIDATE_CHORD), &body).await
}

pub async fn validate_note(config: &EditorConfig, text: &str) -> Result<ValidateResponse> {
    let body = ValidateRequest { text: text.to_string() };
    post_for_json(&config.endpoint(VALIDATE_NOTE), &body).await
}

/// Let the service write tenths offsets into the MusicXML
pub async fn apply_edits_xml(config: &EditorConfig, xml: &str, edits: &EditMap) -> Result<String> {
    let body = ApplyEditsRequest::new(xml, edits);
    let response = post_json(&config.endpoint(APPLY_EDITS_XML), &body).await?;
    checked_text(&response).await
}
