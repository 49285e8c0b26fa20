use std::fs;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// File-backed store: every key is one file in the data directory.
///
/// ```text
/// <data-dir>/
///   todos.json    # slot "todos"
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file backing `key`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && !key.contains("..")
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(Some(data))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        self.ensure_dir()?;

        // Write beside the slot and rename so a crash never leaves half a list.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StorageError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(&path, e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_absent() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("data"));
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("nested").join("data"));

        store.set("todos", "[]").unwrap();

        assert!(temp.path().join("nested/data/todos.json").exists());
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        for key in ["", ".", "../escape", "a/b", "a\\b"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
