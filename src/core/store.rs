//! # Persisted Client State
//!
//! A tiny key/value store for the values that must survive restarts: the
//! active session identifier and the theme preference.
//!
//! `FileStore` keeps everything in one JSON object at `<state-dir>/state.json`.
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Durable string storage under fixed keys.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "state I/O error: {e}"),
            StoreError::Json(e) => write!(f, "state JSON error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            let json = fs::read_to_string(&path).map_err(StoreError::Io)?;
            serde_json::from_str(&json).map_err(StoreError::Json)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened state store at {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    /// Open the store, falling back to an empty one if the file is unreadable.
    /// The broken file is left in place and overwritten on the next write.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Ignoring unreadable state file {}: {}", path.display(), e);
                Self {
                    path,
                    values: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        atomic_write_json(&self.path, &self.values)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(StoreError::Json)?;
    fs::write(&tmp_path, json).map_err(StoreError::Io)?;
    fs::rename(&tmp_path, path).map_err(StoreError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("edubot-store-{}-{}", name, std::process::id()))
            .join("state.json")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = FileStore::open(scratch_path("missing")).unwrap();
        assert_eq!(store.get("session_id"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = scratch_path("reopen");
        let mut store = FileStore::open(&path).unwrap();
        store.set("session_id", "session-abc123def").unwrap();
        store.set("theme", "light").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("session_id").as_deref(), Some("session-abc123def"));
        assert_eq!(reopened.get("theme").as_deref(), Some("light"));
        assert!(!path.with_extension("tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
        let store = FileStore::open_or_empty(&path);
        assert_eq!(store.get("theme"), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
