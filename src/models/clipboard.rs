//! Clipboard records
//!
//! One clipboard slot per session. A multi-element copy stores each element's
//! offset from the group's mean top-left corner so the pasted group keeps its
//! shape.

use serde::{Deserialize, Serialize};

use super::element::ElementKind;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClipItem {
    pub content: String,
    pub kind: ElementKind,
    pub font_size: f64,
    pub font_family: String,
    pub scale: f64,
    pub is_symbol: bool,
    /// Offset from the copied group's mean top-left (0 for single copies)
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Clipboard {
    Single { item: ClipItem },
    Multiple { items: Vec<ClipItem> },
}

impl Clipboard {
    pub fn items(&self) -> &[ClipItem] {
        match self {
            Clipboard::Single { item } => std::slice::from_ref(item),
            Clipboard::Multiple { items } => items,
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Clipboard::Multiple { .. })
    }
}
