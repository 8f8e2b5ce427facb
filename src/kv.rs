//! Key-value byte stores the task list is persisted into.
//!
//! A store maps string keys to opaque byte values. Reads return `None` for a
//! key that was never written; writes replace the whole value or fail without
//! touching it.
//!
//! # File layout
//!
//! ```text
//! <data dir>/
//!   todopad.toml         # Configuration (optional)
//!   tasks.json           # Value stored under key "tasks"
//!   tasks.json.lock      # Lock held while the value is replaced
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

const VALUE_EXTENSION: &str = "json";

pub trait KvStore {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value under `key`. All-or-nothing.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

impl<K: KvStore + ?Sized> KvStore for &K {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<K: KvStore + ?Sized> KvStore for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Keys become file names, so they are restricted to a safe alphabet.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("storage key cannot be empty".to_string()));
    }
    if key.starts_with('.') {
        return Err(Error::InvalidArgument(format!(
            "storage key '{key}' cannot start with '.'"
        )));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
    {
        return Err(Error::InvalidArgument(format!(
            "storage key '{key}' may only contain letters, digits, '-', '_' and '.'"
        )));
    }
    Ok(())
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::OperationFailed("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::OperationFailed("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// File holding the value for `key`
    pub fn value_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.value_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "read value");
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored value");
                Ok(None)
            }
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.value_path(key)?;
        lock::write_atomic_locked(&path, value, self.lock_timeout_ms)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_clones_share_entries() {
        let kv = MemoryKv::new();
        let handle = kv.clone();
        assert!(kv.get("tasks").unwrap().is_none());

        handle.set("tasks", b"[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some(&b"[]"[..]));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn file_store_round_trips_values() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::new(temp.path().join("data"));

        assert!(kv.get("tasks").unwrap().is_none());
        kv.set("tasks", b"[1,2]").unwrap();
        assert_eq!(kv.get("tasks").unwrap(), Some(b"[1,2]".to_vec()));
        assert!(temp.path().join("data").join("tasks.json").exists());

        kv.set("tasks", b"[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn file_store_rejects_unsafe_keys() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::new(temp.path());

        for key in ["", ".hidden", "../escape", "a/b", "sp ace"] {
            assert!(
                matches!(kv.set(key, b"[]"), Err(Error::InvalidArgument(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(kv.value_path("tasks-v1.backup").is_ok());
    }

    #[test]
    fn file_store_times_out_on_held_lock() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::new(temp.path()).with_lock_timeout(50);
        let path = kv.value_path("tasks").unwrap();
        let _held = lock::FileLock::acquire(lock::lock_path_for(&path), 1000).unwrap();

        assert!(matches!(kv.set("tasks", b"[]"), Err(Error::LockFailed(_))));
        assert!(kv.get("tasks").unwrap().is_none());
    }
}
