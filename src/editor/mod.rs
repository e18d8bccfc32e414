//! Selection and manipulation layer
//!
//! Every user gesture on the overlay maps to one operation on
//! [`EditorState`]. Operations mutate the edit map, the deletion set and the
//! selection, snapshot history where a gesture completes, ask the code
//! synchronizer to rewrite the program, and return an [`EditOutcome`] whose
//! patches the JavaScript glue writes to the DOM.

pub mod clipboard;
pub mod create;
pub mod history;
pub mod manipulate;
pub mod mount;
pub mod selection;
pub mod session;
pub mod text_edit;

pub use create::base_id;
pub use mount::{Binding, MountReport};
pub use session::MeasuredBounds;

use crate::models::{DomPatch, EditOutcome, EditorState, SelectionInfo};
use crate::sync::{update_element, Program};

impl EditorState {
    /// Wrap patches with the current selection and history flags
    pub(crate) fn outcome(&self, patches: Vec<DomPatch>, code_changed: bool, persist: bool) -> EditOutcome {
        EditOutcome {
            patches,
            code: code_changed.then(|| self.code.clone()),
            selection: self.selection_info(),
            persist,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    pub fn selection_info(&self) -> SelectionInfo {
        let can_delete = match &self.selected {
            Some(id) => EditorState::can_delete(id),
            None => !self.group.is_empty(),
        };
        SelectionInfo {
            primary: self.selected.clone(),
            group: self.group.clone(),
            group_bounds: self.selection_bounds(),
            can_delete,
        }
    }

    /// Transform patch for `id` from its edit record (identity when none)
    pub(crate) fn transform_patch(&self, id: &str) -> DomPatch {
        let css = self.edits.get(id).cloned().unwrap_or_default().css_transform();
        DomPatch::new(id).transform(css)
    }

    /// Rewrite the statement behind a text element; returns whether the
    /// program changed
    pub(crate) fn sync_element(&mut self, id: &str) -> bool {
        let Some(element) = self.scene.get(id).filter(|e| e.is_text() && !e.is_structural()).cloned() else {
            return false;
        };
        let edit = self.edits.get(id).cloned().unwrap_or_default();
        let mut program = Program::parse(&self.code);
        if update_element(&mut program, &element, &edit, &self.config) {
            self.code = program.to_string();
            true
        } else {
            false
        }
    }

    /// Snapshot edits and deletions
    pub(crate) fn save_state(&mut self) {
        self.history.record(&self.edits, &self.deletions);
    }
}
