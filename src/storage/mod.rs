mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous string key-value primitive the todo list is persisted in.
///
/// Implementations only move strings in and out of named slots; encoding and
/// recovery from bad data live in [`crate::TodoStore`].
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when the slot is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the slot `key` with `value`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
