use crate::models::edit::{DeletionSet, EditMap};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Deep copy of the edit state at one point in time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub edits: EditMap,
    pub deletions: DeletionSet,
}

/// Snapshot history with a cursor for undo/redo
///
/// Elements created after a snapshot are not removed again when it is
/// restored; only edit records and deletions travel through history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct History {
    entries: VecDeque<Snapshot>,
    /// Index of the entry matching the current state; `None` before the first record
    cursor: Option<usize>,
    /// Maximum number of snapshots to keep
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.cursor == other.cursor
    }
}

impl History {
    /// Create a history keeping at most `max_size` snapshots
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            max_size: max_size.max(1),
        }
    }

    /// Record the current state
    ///
    /// Anything past the cursor (the redo tail) is discarded first.
    pub fn record(&mut self, edits: &EditMap, deletions: &DeletionSet) {
        let keep = self.cursor.map(|c| c + 1).unwrap_or(0);
        self.entries.truncate(keep);
        self.entries.push_back(Snapshot {
            edits: edits.clone(),
            deletions: deletions.clone(),
        });

        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
        log::debug!("history: recorded entry {} of {}", self.entries.len(), self.max_size);
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let idx = self.cursor? - 1;
        self.cursor = Some(idx);
        self.entries.get(idx)
    }

    /// Step forward; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let idx = self.cursor.map(|c| c + 1).unwrap_or(0);
        self.cursor = Some(idx);
        self.entries.get(idx)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(c) => c + 1 < self.entries.len(),
            None => false,
        }
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of available undo steps
    pub fn undo_count(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// Number of available redo steps
    pub fn redo_count(&self) -> usize {
        match self.cursor {
            Some(c) => self.entries.len() - c - 1,
            None => 0,
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::edit::EditRecord;

    fn edits_with(id: &str, x: f64) -> EditMap {
        let mut edits = EditMap::new();
        edits.insert(id.to_string(), EditRecord::at(x, 0.0, 2.5));
        edits
    }

    #[test]
    fn test_first_record_cannot_be_undone() {
        let mut history = History::new(10);
        history.record(&EditMap::new(), &DeletionSet::new());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = History::new(10);
        history.record(&EditMap::new(), &DeletionSet::new());
        history.record(&edits_with("a", 5.0), &DeletionSet::new());
        history.record(&edits_with("a", 9.0), &DeletionSet::new());

        let snap = history.undo().unwrap();
        assert_eq!(snap.edits["a"].x, 5.0);
        let snap = history.undo().unwrap();
        assert!(snap.edits.is_empty());
        assert!(!history.can_undo());

        let snap = history.redo().unwrap();
        assert_eq!(snap.edits["a"].x, 5.0);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn test_record_discards_redo_tail() {
        let mut history = History::new(10);
        history.record(&EditMap::new(), &DeletionSet::new());
        history.record(&edits_with("a", 1.0), &DeletionSet::new());
        history.record(&edits_with("a", 2.0), &DeletionSet::new());
        history.undo();
        history.undo();

        let mut deletions = DeletionSet::new();
        deletions.insert("b".to_string());
        history.record(&EditMap::new(), &deletions);

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert!(history.current().unwrap().deletions.contains("b"));
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut history = History::new(10);
        let mut edits = edits_with("a", 1.0);
        history.record(&edits, &DeletionSet::new());
        edits.get_mut("a").unwrap().x = 50.0;
        assert_eq!(history.current().unwrap().edits["a"].x, 1.0);
    }

    #[test]
    fn test_max_size_enforcement() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(&edits_with("a", i as f64), &DeletionSet::new());
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.current().unwrap().edits["a"].x, 4.0);
    }
}
