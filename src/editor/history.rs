//! Undo, redo and re-applying edits to the DOM

use crate::models::{DomPatch, EditOutcome, EditorState};
use crate::undo::Snapshot;

impl EditorState {
    pub fn undo(&mut self) -> EditOutcome {
        match self.history.undo().cloned() {
            Some(snapshot) => self.restore(snapshot),
            None => self.outcome(Vec::new(), false, false),
        }
    }

    pub fn redo(&mut self) -> EditOutcome {
        match self.history.redo().cloned() {
            Some(snapshot) => self.restore(snapshot),
            None => self.outcome(Vec::new(), false, false),
        }
    }

    /// Make the scene match a snapshot
    ///
    /// Deleted ids are hidden; everything else is shown with its transform,
    /// and texts get their edited or remembered original content. Elements
    /// created after the snapshot stay in place.
    fn restore(&mut self, snapshot: Snapshot) -> EditOutcome {
        self.edits = snapshot.edits;
        self.deletions = snapshot.deletions;

        let mut patches = Vec::new();
        let ids: Vec<String> = self.scene.elements.iter().filter(|e| !e.id.is_empty()).map(|e| e.id.clone()).collect();
        for id in ids {
            if self.deletions.contains(&id) {
                patches.push(DomPatch::new(&id).hidden(true));
                continue;
            }
            let mut patch = self.transform_patch(&id).hidden(false);
            let text = self
                .edits
                .get(&id)
                .and_then(|e| e.text_content.clone())
                .or_else(|| self.original_texts.get(&id).cloned());
            if let Some(element) = self.scene.get_mut(&id).filter(|e| e.is_text() && !e.is_structural()) {
                if let Some(text) = text {
                    element.text = text.clone();
                    patch = patch.text(text);
                }
            }
            patches.push(patch);
        }
        patches.extend(self.clear_group());
        log::info!("history: restored {} edit(s), {} deletion(s)", self.edits.len(), self.deletions.len());
        self.outcome(patches, false, true)
    }

    /// Seed history with the empty state, unless edits already exist
    pub fn reset_initial(&mut self) {
        if !self.edits.is_empty() {
            return;
        }
        self.edits.clear();
        self.deletions.clear();
        self.history.clear();
        self.next_suffix = 0;
        self.save_state();
    }

    /// Patches bringing the DOM in line with the edit map and deletions
    pub fn apply_transforms(&self) -> EditOutcome {
        let mut patches = Vec::new();
        for (id, edit) in &self.edits {
            let Some(element) = self.scene.get(id) else {
                continue;
            };
            if self.deletions.contains(id) {
                continue;
            }
            let mut patch = DomPatch::new(id).transform(edit.css_transform());
            if let Some(text) = edit.text_content.as_ref().filter(|_| element.is_text()) {
                patch = patch.text(text.clone());
            }
            patches.push(patch);
        }
        for id in &self.deletions {
            if self.scene.contains(id) {
                patches.push(DomPatch::new(id).hidden(true));
            }
        }
        self.outcome(patches, false, false)
    }
}
