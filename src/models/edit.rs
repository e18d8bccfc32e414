//! Edit records
//!
//! An [`EditRecord`] is the per-element visual override produced by dragging,
//! scaling and retyping. Records are keyed by element id and are not tied to
//! the live scene: a record may outlive the element it was made for.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Element id → visual override
pub type EditMap = BTreeMap<String, EditRecord>;

/// Ids of elements the user removed
pub type DeletionSet = BTreeSet<String>;

/// Convert a pixel offset to MusicXML tenths (rounded)
pub fn px_to_tenths(px: f64, tenths_per_px: f64) -> i64 {
    (px * tenths_per_px).round() as i64
}

/// Convert MusicXML tenths back to pixels
pub fn tenths_to_px(tenths: i64, tenths_per_px: f64) -> f64 {
    tenths as f64 / tenths_per_px
}

/// Position of an element relative to the centre of its nearest measure
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasureOffset {
    /// 1-based measure index
    pub measure_number: usize,
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub x_tenths: i64,
    #[serde(default)]
    pub y_tenths: i64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Raw (possibly multi-line) replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(flatten)]
    pub measure_offset: Option<MeasureOffset>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for EditRecord {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            x_tenths: 0,
            y_tenths: 0,
            scale: 1.0,
            text_content: None,
            measure_offset: None,
        }
    }
}

impl EditRecord {
    /// Record positioned at a pixel offset
    pub fn at(x: f64, y: f64, tenths_per_px: f64) -> Self {
        let mut edit = Self::default();
        edit.set_position(x, y, tenths_per_px);
        edit
    }

    /// Move by a pixel delta, keeping the tenths mirror in step
    pub fn translate(&mut self, dx: f64, dy: f64, tenths_per_px: f64) {
        self.set_position(self.x + dx, self.y + dy, tenths_per_px);
    }

    pub fn set_position(&mut self, x: f64, y: f64, tenths_per_px: f64) {
        self.x = x;
        self.y = y;
        self.x_tenths = px_to_tenths(x, tenths_per_px);
        self.y_tenths = px_to_tenths(y, tenths_per_px);
    }

    /// Multiply the scale factor; scaling is about the element centre
    pub fn rescale(&mut self, factor: f64) {
        let current = if self.scale == 0.0 { 1.0 } else { self.scale };
        self.scale = current * factor;
    }

    /// Scale as a rounded percentage, e.g. `1.1` → `110`
    pub fn scale_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }

    pub fn is_scaled(&self) -> bool {
        (self.scale - 1.0).abs() > f64::EPSILON
    }

    /// CSS transform the element must carry
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.x, self.y, self.scale
        )
    }
}
