//! Persistent key-value storage for chat history.
//!
//! Values are JSON arrays of [`ChatTurn`]s. The file store keeps one
//! `<key>.json` file per key inside its directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

use super::ChatTurn;

/// Errors raised while reading or writing history.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Filesystem failure.
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value is not a JSON array of chat turns.
    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value persistence for chat turns.
pub trait HistoryStore: Send + Sync {
    /// Read the turns stored under `key`. `Ok(None)` when nothing is stored.
    fn load(&self, key: &str) -> Result<Option<Vec<ChatTurn>>, HistoryError>;

    /// Replace whatever is stored under `key`.
    fn save(&self, key: &str, turns: &[ChatTurn]) -> Result<(), HistoryError>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), HistoryError>;
}

/// Stores each key as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location: the platform data directory, falling back to `./.mindbridge`.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::data_dir().map_or_else(|| PathBuf::from(".mindbridge"), |d| d.join("mindbridge"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<ChatTurn>>, HistoryError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, key: &str, turns: &[ChatTurn]) -> Result<(), HistoryError> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(turns)?;
        std::fs::write(self.path_for(key), content)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store holding raw JSON strings, like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    /// Overwrite the raw value for `key` without validation.
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().unwrap().insert(key.into(), value.into());
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<ChatTurn>>, HistoryError> {
        match self.raw(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, turns: &[ChatTurn]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(turns)?;
        self.set_raw(key, raw);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        self.values.write().unwrap().remove(key);
        Ok(())
    }
}
