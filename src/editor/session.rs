//! Persisted state, measured geometry and post-reload positions

use serde::{Deserialize, Serialize};

use crate::measure::recalculate;
use crate::models::{EditOutcome, EditorState, Rect};
use crate::persistence::PersistedState;

/// Measured box of one element, reported by the glue
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MeasuredBounds {
    pub id: String,
    #[serde(flatten)]
    pub bounds: Rect,
}

impl EditorState {
    /// Edits and deletions in their stored form
    pub fn persisted_state(&self, timestamp: i64) -> PersistedState {
        PersistedState {
            edits: self.edits.clone(),
            deletions: self.deletions.clone(),
            timestamp,
        }
    }

    /// Adopt stored edits and deletions and re-apply them to the DOM
    pub fn load_persisted(&mut self, state: PersistedState) -> EditOutcome {
        self.edits = state.edits;
        self.deletions = state.deletions;
        log::info!(
            "editor: restored {} edit(s), {} deletion(s) from storage",
            self.edits.len(),
            self.deletions.len()
        );
        self.apply_transforms()
    }

    pub fn set_measure_boxes(&mut self, boxes: Vec<Rect>) {
        log::debug!("editor: {} measure box(es)", boxes.len());
        self.scene.measure_boxes = boxes;
    }

    /// Replace estimated boxes with measured ones; returns how many matched
    pub fn update_bounds(&mut self, measured: Vec<MeasuredBounds>) -> usize {
        let mut updated = 0;
        for m in measured {
            if let Some(element) = self.scene.get_mut(&m.id) {
                element.bounds = m.bounds;
                updated += 1;
            }
        }
        updated
    }

    /// Re-derive pixel offsets of measure-anchored edits from the current
    /// measure boxes; returns how many records changed
    pub fn recalculate_positions(&mut self) -> usize {
        let tpp = self.config.tenths_per_px;
        let mut changed = 0;
        for (id, edit) in self.edits.iter_mut() {
            let Some(element) = self.scene.get(id) else {
                continue;
            };
            if recalculate(edit, &self.scene.measure_boxes, &element.bounds, tpp) {
                changed += 1;
            }
        }
        if changed > 0 {
            log::info!("editor: {} position(s) re-anchored to their measures", changed);
        }
        changed
    }
}
