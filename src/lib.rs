//! Score Overlay Editor WASM Module
//!
//! Visual editing on top of a rendered music score: select, drag, scale,
//! delete, copy and retype annotations while the music21 program that
//! produced the score is kept in step.

pub mod config;
pub mod error;
pub mod models;
pub mod undo;
pub mod linker;
pub mod sync;
pub mod render;
pub mod persistence;
pub mod measure;
pub mod playback;
pub mod editor;
pub mod api;

// Re-export commonly used types
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use models::{DomPatch, EditOutcome, EditRecord, EditorState, Rect, Scene, SceneElement};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }

    log::info!("Score overlay editor WASM module initialized");
}
