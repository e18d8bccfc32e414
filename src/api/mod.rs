//! Score Overlay Editor WASM API
//!
//! This module provides the JavaScript-facing API for the overlay editor.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging macros, serialization and error conversion
//! - `types`: Result shapes combining several core values
//! - `storage`: `localStorage` implementation of the persistence store
//! - `network`: `fetch` calls to the score service
//! - `core`: The exported session functions

pub mod helpers;
pub mod types;
pub mod storage;
pub mod network;
pub mod core;

pub use self::core::*;
