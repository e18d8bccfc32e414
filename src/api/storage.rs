//! Browser `localStorage` backing for persisted edits

use web_sys::Storage;

use crate::error::{EditorError, Result};
use crate::persistence::KeyValueStore;

use super::helpers::js_message;

/// `window.localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| EditorError::Storage("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| EditorError::Storage(js_message(&e)))?
            .ok_or_else(|| EditorError::Storage("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(|e| EditorError::Storage(js_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(|e| EditorError::Storage(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(|e| EditorError::Storage(js_message(&e)))
    }
}
