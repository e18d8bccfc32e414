//! Editor configuration
//!
//! Layout and service tunables. JavaScript passes a plain
//! object; every field is optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};

/// MusicXML tenths per screen pixel at the renderer's default zoom
pub const DEFAULT_TENTHS_PER_PX: f64 = 2.5;

/// Local storage key for persisted edits
pub const DEFAULT_STORAGE_KEY: &str = "scoreEdits";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Linear px → tenths factor
    pub tenths_per_px: f64,
    /// Offset applied to pasted elements so they don't cover the source
    pub paste_offset: f64,
    /// Maximum number of history snapshots kept
    pub history_limit: usize,
    pub storage_key: String,
    /// Prefix prepended to every service endpoint (empty = same origin)
    pub endpoint_base: String,
    /// A text above this y with a font larger than `title_min_font_size` is a title
    pub title_max_y: f64,
    pub title_min_font_size: f64,
    /// New annotations above this y are placed `above` the staff
    pub placement_threshold_y: f64,
    /// Padding around the multi-selection bounding box
    pub group_padding: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tenths_per_px: DEFAULT_TENTHS_PER_PX,
            paste_offset: 20.0,
            history_limit: 100,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            endpoint_base: String::new(),
            title_max_y: 100.0,
            title_min_font_size: 22.0,
            placement_threshold_y: 200.0,
            group_padding: 10.0,
        }
    }
}

impl EditorConfig {
    /// Full URL for a service endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.endpoint_base.trim_end_matches('/'), path)
    }
}
