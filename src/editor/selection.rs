//! Single and rectangle selection

use crate::error::{EditorError, Result};
use crate::models::{DomPatch, EditOutcome, EditorState, Rect, MULTI_SELECTED_CLASS, SELECTED_CLASS, SHEET_ID};

impl EditorState {
    /// Select one element
    ///
    /// Selecting the selected element does nothing, and the first click after
    /// a rectangle selection is swallowed.
    pub fn select(&mut self, id: &str) -> Result<EditOutcome> {
        if !self.scene.contains(id) {
            return Err(EditorError::UnknownElement(id.to_string()));
        }
        if self.selected.as_deref() == Some(id) {
            return Ok(self.outcome(Vec::new(), false, false));
        }
        if self.just_completed_selection {
            self.just_completed_selection = false;
            log::debug!("selection: click after rectangle selection ignored");
            return Ok(self.outcome(Vec::new(), false, false));
        }

        let mut patches = self.clear_selection();
        patches.push(DomPatch::new(id).add_class(SELECTED_CLASS));
        self.selected = Some(id.to_string());
        log::debug!("selection: {}", id);
        Ok(self.outcome(patches, false, false))
    }

    pub fn deselect_all(&mut self) -> EditOutcome {
        let patches = self.clear_selection();
        self.outcome(patches, false, false)
    }

    /// Drop both selections, returning the class patches
    pub(crate) fn clear_selection(&mut self) -> Vec<DomPatch> {
        let mut patches = Vec::new();
        if let Some(id) = self.selected.take() {
            patches.push(DomPatch::new(id).remove_class(SELECTED_CLASS));
        }
        patches.extend(self.clear_group());
        patches
    }

    pub(crate) fn clear_group(&mut self) -> Vec<DomPatch> {
        self.group
            .drain(..)
            .map(|id| DomPatch::new(id).remove_class(MULTI_SELECTED_CLASS))
            .collect()
    }

    /// Add every visible text touching `rect` to the multi-selection
    ///
    /// Without `additive` the previous multi-selection is dropped first.
    pub fn select_in_rect(&mut self, rect: Rect, additive: bool) -> EditOutcome {
        let mut patches = if additive { Vec::new() } else { self.clear_group() };

        let hits: Vec<String> = self
            .scene
            .text_elements()
            .filter(|e| !e.is_structural() && !e.hidden && !self.is_deleted(&e.id))
            .filter(|e| self.displayed_bounds(e).intersects(&rect))
            .map(|e| e.id.clone())
            .collect();

        let mut added = 0usize;
        for id in hits {
            if self.in_group(&id) {
                continue;
            }
            patches.push(DomPatch::new(&id).add_class(MULTI_SELECTED_CLASS));
            self.group.push(id);
            added += 1;
        }

        if added > 0 {
            if self.selected.as_deref() == Some(SHEET_ID) {
                self.selected = None;
                patches.push(DomPatch::new(SHEET_ID).remove_class(SELECTED_CLASS));
            }
            self.just_completed_selection = true;
            log::info!("selection: {} element(s) in rectangle, {} selected", added, self.group.len());
        } else {
            log::warn!("selection: rectangle selected nothing");
        }
        self.outcome(patches, false, false)
    }

    /// Union of the displayed boxes of the multi-selection, padded
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.group
            .iter()
            .filter(|id| !self.is_deleted(id))
            .filter_map(|id| self.scene.get(id))
            .map(|e| self.displayed_bounds(e))
            .reduce(|a, b| a.union(&b))
            .map(|r| r.padded(self.config.group_padding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layer, SceneElement};

    fn state() -> EditorState {
        let mut state = EditorState::default();
        state.scene.push(SceneElement::text("Am", Rect::new(10.0, 10.0, 20.0, 10.0)).with_id("Am-0"));
        state.scene.push(SceneElement::text("G7", Rect::new(100.0, 10.0, 20.0, 10.0)).with_id("G7-0"));
        state
            .scene
            .push(SceneElement::text("Fine", Rect::new(300.0, 200.0, 40.0, 10.0)).with_id("Fine-0").on_layer(Layer::Annotation));
        state
    }

    #[test]
    fn select_replaces_previous() {
        let mut state = state();
        state.select("Am-0").unwrap();
        let out = state.select("G7-0").unwrap();
        assert_eq!(out.patches[0].id, "Am-0");
        assert_eq!(out.patches[0].remove_classes, vec![SELECTED_CLASS]);
        assert_eq!(out.patches[1].add_classes, vec![SELECTED_CLASS]);
        assert_eq!(out.selection.primary.as_deref(), Some("G7-0"));
    }

    #[test]
    fn reselect_is_noop() {
        let mut state = state();
        state.select("Am-0").unwrap();
        assert!(state.select("Am-0").unwrap().patches.is_empty());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut state = state();
        assert!(state.select("nope").is_err());
    }

    #[test]
    fn rectangle_selects_intersecting_texts_and_guards_next_click() {
        let mut state = state();
        let out = state.select_in_rect(Rect::new(0.0, 0.0, 150.0, 50.0), false);
        assert_eq!(out.selection.group, vec!["Am-0", "G7-0"]);
        assert!(state.just_completed_selection);

        let out = state.select("Fine-0").unwrap();
        assert!(out.patches.is_empty());
        assert!(!state.just_completed_selection);
        assert_eq!(state.group.len(), 2);
    }

    #[test]
    fn rectangle_skips_deleted_and_follows_transforms() {
        let mut state = state();
        state.deletions.insert("Am-0".into());
        state.edit_mut("Fine-0").translate(-290.0, -190.0, 2.5);
        state.select_in_rect(Rect::new(0.0, 0.0, 50.0, 50.0), false);
        assert_eq!(state.group, vec!["Fine-0"]);
    }

    #[test]
    fn additive_rectangle_keeps_group() {
        let mut state = state();
        state.select_in_rect(Rect::new(0.0, 0.0, 40.0, 40.0), false);
        state.select_in_rect(Rect::new(90.0, 0.0, 40.0, 40.0), true);
        assert_eq!(state.group, vec!["Am-0", "G7-0"]);
        state.select_in_rect(Rect::new(90.0, 0.0, 40.0, 40.0), false);
        assert_eq!(state.group, vec!["G7-0"]);
    }

    #[test]
    fn bounds_are_padded_union() {
        let mut state = state();
        state.select_in_rect(Rect::new(0.0, 0.0, 150.0, 50.0), false);
        assert_eq!(state.selection_bounds(), Some(Rect::new(0.0, 0.0, 130.0, 30.0)));
        assert!(state.selection_info().can_delete);
    }
}
