//! Local key-value persistence.
//!
//! The browser build kept the cart and the signed-in identity in local
//! storage. Here that becomes an injectable port with a narrow
//! load/save/remove surface:
//!
//! - [`MemoryKeyValueStore`] - process-local, used by tests
//! - [`FileKeyValueStore`] - one JSON file per key under a data directory
//!
//! Writes are whole-value overwrites. Each write goes through its own
//! temporary file, so concurrent writers to the same key never interleave
//! their bytes; the last rename wins.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous key-value persistence port.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys are restricted to `[A-Za-z0-9_-]` so they map 1:1 to file names.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Store that keeps each key in `<dir>/<key>.json`.
///
/// The directory is created on first write. Values are written to a
/// uniquely named temporary file in the same directory and renamed into
/// place, so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.load("shopnow-cart").unwrap(), None);

        store.save("shopnow-cart", "[]").unwrap();
        assert_eq!(store.load("shopnow-cart").unwrap().as_deref(), Some("[]"));

        store.save("shopnow-cart", "[1]").unwrap();
        assert_eq!(store.load("shopnow-cart").unwrap().as_deref(), Some("[1]"));

        store.remove("shopnow-cart").unwrap();
        store.remove("shopnow-cart").unwrap();
        assert_eq!(store.load("shopnow-cart").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryKeyValueStore::new());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));
        exercise(&store);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileKeyValueStore::new(dir.path())
            .save("shopnow-session", "{\"uid\":\"u1\"}")
            .unwrap();

        let reopened = FileKeyValueStore::new(dir.path());
        assert_eq!(
            reopened.load("shopnow-session").unwrap().as_deref(),
            Some("{\"uid\":\"u1\"}")
        );
    }

    #[test]
    fn test_concurrent_saves_leave_one_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<String> = (0..8)
            .map(|i| format!("[{}0]", "7,".repeat(i * 500)))
            .collect();

        std::thread::scope(|scope| {
            for value in &values {
                let store = FileKeyValueStore::new(dir.path());
                scope.spawn(move || {
                    for _ in 0..20 {
                        store.save("shopnow-cart", value).unwrap();
                    }
                });
            }
        });

        let stored = FileKeyValueStore::new(dir.path())
            .load("shopnow-cart")
            .unwrap()
            .unwrap();
        assert!(values.contains(&stored));

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("shopnow-cart.json")]);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = MemoryKeyValueStore::new();
        assert!(matches!(
            store.save("../etc/passwd", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.load(""), Err(StorageError::InvalidKey(_))));
    }
}
