//! Editor state management
//!
//! This module contains the EditorState struct which represents the complete
//! state of one editing session: the scene, the edit map and deletions, the
//! selection, the clipboard, history and the program text.
//!
//! This is the WASM-owned source of truth; the operations live in
//! [`crate::editor`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::EditorConfig;
use crate::linker::{LineMap, StableIdMap};
use crate::models::clipboard::Clipboard;
use crate::models::edit::{DeletionSet, EditMap, EditRecord};
use crate::models::element::{Rect, Scene, SceneElement};
use crate::undo::History;

/// Complete editor state (WASM-owned source of truth)
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub config: EditorConfig,

    /// What is on screen
    pub scene: Scene,

    /// The score-description program
    pub code: String,

    /// MusicXML of the last render
    pub score_xml: Option<String>,

    pub edits: EditMap,
    pub deletions: DeletionSet,

    /// Single selection
    pub selected: Option<String>,

    /// Multi-selection, in selection order
    pub group: Vec<String>,

    /// Set when a rectangle selection completes; swallows the click that ends it
    pub just_completed_selection: bool,

    pub clipboard: Option<Clipboard>,

    pub history: History,

    /// Text of an element before its first in-place edit
    pub original_texts: BTreeMap<String, String>,

    /// Contents of rendered texts recreated on the overlay layer
    pub converted_texts: BTreeSet<String>,

    /// Element being retyped
    pub editing: Option<String>,

    pub stable_ids: StableIdMap,
    pub line_map: LineMap,

    /// Suffix for the next generated program variable
    pub next_suffix: u64,
}

impl EditorState {
    /// Create an empty session
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(config.history_limit);
        Self {
            config,
            scene: Scene::new(),
            code: String::new(),
            score_xml: None,
            edits: EditMap::new(),
            deletions: DeletionSet::new(),
            selected: None,
            group: Vec::new(),
            just_completed_selection: false,
            clipboard: None,
            history,
            original_texts: BTreeMap::new(),
            converted_texts: BTreeSet::new(),
            editing: None,
            stable_ids: StableIdMap::new(),
            line_map: LineMap::new(),
            next_suffix: 0,
        }
    }

    pub fn element(&self, id: &str) -> Option<&SceneElement> {
        self.scene.get(id)
    }

    /// Edit record for `id`, created on first use
    pub fn edit_mut(&mut self, id: &str) -> &mut EditRecord {
        self.edits.entry(id.to_string()).or_default()
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.deletions.contains(id)
    }

    pub fn in_group(&self, id: &str) -> bool {
        self.group.iter().any(|g| g == id)
    }

    /// Box of an element as displayed: edit offset applied, scaled about
    /// its centre
    pub fn displayed_bounds(&self, element: &SceneElement) -> Rect {
        let Some(edit) = self.edits.get(&element.id) else {
            return element.bounds;
        };
        let b = element.bounds.translated(edit.x, edit.y);
        let w = b.width * edit.scale;
        let h = b.height * edit.scale;
        let c = b.center();
        Rect::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Whether the delete action applies to `id`
    pub fn can_delete(id: &str) -> bool {
        id != crate::models::element::SHEET_ID && id != crate::models::element::STAFF_ID
    }

    /// Take the next variable suffix
    pub fn take_suffix(&mut self) -> u64 {
        let suffix = self.next_suffix;
        self.next_suffix += 1;
        suffix
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displayed_bounds_apply_offset_and_scale() {
        let mut state = EditorState::default();
        state.scene.push(SceneElement::text("Am", Rect::new(10.0, 10.0, 20.0, 10.0)).with_id("Am-0"));
        let element = state.element("Am-0").unwrap().clone();
        assert_eq!(state.displayed_bounds(&element), Rect::new(10.0, 10.0, 20.0, 10.0));

        let edit = state.edit_mut("Am-0");
        edit.x = 5.0;
        edit.scale = 2.0;
        assert_eq!(state.displayed_bounds(&element), Rect::new(5.0, 5.0, 40.0, 20.0));
    }

    #[test]
    fn structural_ids_cannot_be_deleted() {
        assert!(!EditorState::can_delete("sheet-music-svg"));
        assert!(!EditorState::can_delete("staff-only"));
        assert!(EditorState::can_delete("Am-0"));
    }

    #[test]
    fn suffixes_increase() {
        let mut state = EditorState::default();
        assert_eq!(state.take_suffix(), 0);
        assert_eq!(state.take_suffix(), 1);
    }
}
