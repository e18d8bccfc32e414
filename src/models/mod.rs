//! Models module for the score overlay editor
//!
//! This module contains the data models shared by the render driver, the
//! linker, the editing operations and the code synchronizer.

pub mod clipboard;
pub mod edit;
pub mod editor_state;
pub mod element;
pub mod patch;

// Re-export commonly used types
pub use clipboard::{ClipItem, Clipboard};
pub use edit::{px_to_tenths, tenths_to_px, DeletionSet, EditMap, EditRecord, MeasureOffset};
pub use editor_state::EditorState;
pub use element::{ElementKind, Layer, Point, Rect, Scene, SceneElement, OVERLAY_PREFIX, SHEET_ID, STAFF_ID};
pub use patch::{DomPatch, EditOutcome, SelectionInfo, MULTI_SELECTED_CLASS, SELECTED_CLASS};
