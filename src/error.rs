//! Error types for the overlay editor
//!
//! Errors from the render service, the local store and the score/MIDI parsers
//! all funnel into [`EditorError`]. The WASM API turns them into `JsValue`
//! strings at the boundary.

use thiserror::Error;

/// Top-level editor error type
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// The render service answered with a non-success status
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The render service answered 2xx but the body is not MusicXML
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON (de)serialization failed
    #[error("json error: {0}")]
    Json(String),

    /// SVG or MusicXML could not be parsed or rewritten
    #[error("xml error: {0}")]
    Xml(String),

    /// MIDI data could not be decoded
    #[error("midi error: {0}")]
    Midi(String),

    /// An operation referenced an element that is not in the scene
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// No score has been mounted yet
    #[error("no score loaded")]
    NoDocument,

    /// Browser storage rejected a read or write
    #[error("storage error: {0}")]
    Storage(String),

    /// Network call failed before a response was received
    #[error("network error: {0}")]
    Network(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Json(e.to_string())
    }
}

impl From<roxmltree::Error> for EditorError {
    fn from(e: roxmltree::Error) -> Self {
        EditorError::Xml(e.to_string())
    }
}

impl From<quick_xml::Error> for EditorError {
    fn from(e: quick_xml::Error) -> Self {
        EditorError::Xml(e.to_string())
    }
}

impl From<std::io::Error> for EditorError {
    fn from(e: std::io::Error) -> Self {
        EditorError::Xml(e.to_string())
    }
}

impl From<midly::Error> for EditorError {
    fn from(e: midly::Error) -> Self {
        EditorError::Midi(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
