use std::cell::RefCell;
use std::collections::HashMap;

use super::{KeyValueStore, StorageError};

/// In-process store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value into a slot, bypassing any encoding.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.slots.borrow_mut().insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert_raw(key, value);
        Ok(())
    }
}
