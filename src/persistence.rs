//! Session persistence
//!
//! Edits and deletions are written as one JSON document under a single key.
//! The browser's `localStorage` is one [`KeyValueStore`]; tests use
//! [`MemoryStore`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::edit::{DeletionSet, EditMap};

/// What survives a page reload
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PersistedState {
    #[serde(default)]
    pub edits: EditMap,
    #[serde(default)]
    pub deletions: DeletionSet,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Write the session under `key`
pub fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    edits: &EditMap,
    deletions: &DeletionSet,
    timestamp: i64,
) -> Result<()> {
    let state = PersistedState {
        edits: edits.clone(),
        deletions: deletions.clone(),
        timestamp,
    };
    let json = serde_json::to_string(&state)?;
    store.set(key, &json)?;
    log::debug!(
        "persistence: saved {} edit(s), {} deletion(s)",
        edits.len(),
        deletions.len()
    );
    Ok(())
}

/// Read the session stored under `key`
///
/// Absent, unreadable and malformed data all yield `None`.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<PersistedState> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("persistence: could not read '{}': {}", key, e);
            return None;
        }
    };
    match serde_json::from_str::<PersistedState>(&raw) {
        Ok(state) => {
            log::info!(
                "persistence: loaded {} edit(s), {} deletion(s)",
                state.edits.len(),
                state.deletions.len()
            );
            Some(state)
        }
        Err(e) => {
            log::warn!("persistence: ignoring malformed state under '{}': {}", key, e);
            None
        }
    }
}

pub fn clear<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Result<()> {
    store.remove(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::edit::EditRecord;

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let mut edits = EditMap::new();
        edits.insert("Am-0".into(), EditRecord::at(12.0, -4.0, 2.5));
        let mut deletions = DeletionSet::new();
        deletions.insert("rit.-0".into());

        save(&mut store, "scoreEdits", &edits, &deletions, 1_700_000_000_000).unwrap();
        let state = load(&store, "scoreEdits").unwrap();
        assert_eq!(state.edits, edits);
        assert!(state.deletions.contains("rit.-0"));
        assert_eq!(state.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn deletions_are_stored_as_array() {
        let mut store = MemoryStore::new();
        let mut deletions = DeletionSet::new();
        deletions.insert("a".into());
        save(&mut store, "k", &EditMap::new(), &deletions, 0).unwrap();
        let raw = store.get("k").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["deletions"], serde_json::json!(["a"]));
    }

    #[test]
    fn missing_or_malformed_is_none() {
        let mut store = MemoryStore::new();
        assert!(load(&store, "scoreEdits").is_none());
        store.set("scoreEdits", "{not json").unwrap();
        assert!(load(&store, "scoreEdits").is_none());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set("k", r#"{"edits": {"x-0": {"x": 1, "y": 2}}}"#).unwrap();
        let state = load(&store, "k").unwrap();
        assert_eq!(state.edits["x-0"].scale, 1.0);
        assert!(state.deletions.is_empty());
    }

    #[test]
    fn clear_removes_key() {
        let mut store = MemoryStore::new();
        save(&mut store, "k", &EditMap::new(), &DeletionSet::new(), 0).unwrap();
        clear(&mut store, "k").unwrap();
        assert!(load(&store, "k").is_none());
    }
}
