//! Dragging, scaling and deleting

use crate::error::{EditorError, Result};
use crate::measure::relative_offset;
use crate::models::{
    DomPatch, EditOutcome, EditorState, Layer, MULTI_SELECTED_CLASS, OVERLAY_PREFIX, SELECTED_CLASS, SHEET_ID, STAFF_ID,
};
use crate::sync::{comment_out_deleted, Program};

impl EditorState {
    /// Move an element by a pointer delta
    ///
    /// When `id` belongs to a multi-selection of more than one element the
    /// whole group moves. Dragging the sheet or the staff drags the overlay
    /// copies of rendered texts along.
    pub fn drag(&mut self, id: &str, dx: f64, dy: f64) -> Result<EditOutcome> {
        if !self.scene.contains(id) {
            return Err(EditorError::UnknownElement(id.to_string()));
        }
        let tpp = self.config.tenths_per_px;

        if self.group.len() > 1 && self.in_group(id) {
            let members = self.group.clone();
            let patches = members
                .iter()
                .map(|member| {
                    self.edit_mut(member).translate(dx, dy, tpp);
                    self.transform_patch(member)
                })
                .collect();
            return Ok(self.outcome(patches, false, false));
        }

        self.edit_mut(id).translate(dx, dy, tpp);

        let track_measure = self.scene.get(id).map_or(false, |e| e.is_text() && !e.is_structural());
        if track_measure && !self.scene.measure_boxes.is_empty() {
            let offset = self
                .scene
                .get(id)
                .map(|e| self.displayed_bounds(e))
                .and_then(|b| relative_offset(&b, &self.scene.measure_boxes));
            self.edit_mut(id).measure_offset = offset;
        }

        let mut patches = vec![self.transform_patch(id)];
        if id == SHEET_ID || id == STAFF_ID {
            patches.extend(self.sync_overlay_with_staff(dx, dy));
        }
        Ok(self.outcome(patches, false, false))
    }

    /// Finish a drag: snapshot, persist and rewrite the moved statements
    pub fn drag_end(&mut self, id: &str) -> Result<EditOutcome> {
        if !self.scene.contains(id) {
            return Err(EditorError::UnknownElement(id.to_string()));
        }
        self.save_state();

        let moved: Vec<String> = if self.group.len() > 1 && self.in_group(id) {
            self.group.clone()
        } else {
            vec![id.to_string()]
        };
        let mut code_changed = false;
        for member in &moved {
            code_changed |= self.sync_element(member);
        }
        Ok(self.outcome(Vec::new(), code_changed, true))
    }

    /// Move the multi-selection by dragging its bounding box
    pub fn move_group(&mut self, dx: f64, dy: f64) -> EditOutcome {
        let tpp = self.config.tenths_per_px;
        let members = self.group.clone();
        let patches = members
            .iter()
            .map(|member| {
                self.edit_mut(member).translate(dx, dy, tpp);
                self.transform_patch(member)
            })
            .collect();
        self.outcome(patches, false, false)
    }

    /// Release of the group box
    pub fn end_group_move(&mut self) -> EditOutcome {
        self.save_state();
        self.outcome(Vec::new(), false, true)
    }

    /// Move every `overlay-` element on the annotation layer by the same delta
    pub fn sync_overlay_with_staff(&mut self, dx: f64, dy: f64) -> Vec<DomPatch> {
        let tpp = self.config.tenths_per_px;
        let overlays: Vec<String> = self
            .scene
            .elements
            .iter()
            .filter(|e| e.layer == Layer::Annotation && e.id.starts_with(OVERLAY_PREFIX))
            .map(|e| e.id.clone())
            .collect();
        overlays
            .iter()
            .map(|id| {
                self.edit_mut(id).translate(dx, dy, tpp);
                self.transform_patch(id)
            })
            .collect()
    }

    /// Multiply the scale of the selection
    ///
    /// A multi-selection scales as a whole with one snapshot; a single text
    /// also has its statement rewritten.
    pub fn scale(&mut self, factor: f64) -> EditOutcome {
        if !self.group.is_empty() {
            let members = self.group.clone();
            let patches = members
                .iter()
                .map(|member| {
                    self.edit_mut(member).rescale(factor);
                    self.transform_patch(member)
                })
                .collect();
            self.save_state();
            log::info!("editor: scale x{} on {} element(s)", factor, members.len());
            return self.outcome(patches, false, true);
        }

        let Some(id) = self.selected.clone() else {
            return self.outcome(Vec::new(), false, false);
        };
        self.edit_mut(&id).rescale(factor);
        let patches = vec![self.transform_patch(&id)];
        self.save_state();
        let code_changed = self.sync_element(&id);
        self.outcome(patches, code_changed, true)
    }

    /// Delete the selection and comment out its statements
    ///
    /// The sheet and the staff group are never deleted.
    pub fn delete_selected(&mut self) -> EditOutcome {
        let (ids, mut patches) = if !self.group.is_empty() {
            let ids: Vec<String> = self.group.iter().filter(|id| EditorState::can_delete(id)).cloned().collect();
            (ids, self.clear_group())
        } else {
            match self.selected.clone() {
                Some(id) if EditorState::can_delete(&id) => (vec![id], self.clear_selection()),
                Some(id) => {
                    log::warn!("editor: {} cannot be deleted", id);
                    return self.outcome(Vec::new(), false, false);
                }
                None => return self.outcome(Vec::new(), false, false),
            }
        };
        if ids.is_empty() {
            return self.outcome(patches, false, false);
        }

        for id in &ids {
            self.deletions.insert(id.clone());
            patches.push(
                DomPatch::new(id)
                    .hidden(true)
                    .remove_class(SELECTED_CLASS)
                    .remove_class(MULTI_SELECTED_CLASS),
            );
        }
        self.save_state();

        let mut program = Program::parse(&self.code);
        let commented = comment_out_deleted(&mut program, ids.iter(), &self.scene, &self.edits);
        if commented > 0 {
            self.code = program.to_string();
        }
        log::info!("editor: {} element(s) deleted, {} statement(s) commented", ids.len(), commented);
        self.outcome(patches, commented > 0, true)
    }
}
