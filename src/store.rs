//! Snapshot persistence: a key/bytes store the host provides, plus two ready implementations.

use crate::models::{Tournament, TournamentSnapshot};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Opaque key/value store. The core never knows the storage technology behind it.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }
}

/// One `{key}.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    pub dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Tournament {
    /// Serialize the full state under `key`.
    pub fn save_to(&self, store: &mut dyn SnapshotStore, key: &str) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.snapshot())?;
        store.set(key, bytes)?;
        log::debug!("Saved tournament {} under {}", self.id, key);
        Ok(())
    }

    /// Reload a tournament saved with `save_to`. `None` when the key is absent.
    pub fn load_from(store: &dyn SnapshotStore, key: &str) -> Result<Option<Self>, StoreError> {
        let Some(bytes) = store.get(key)? else {
            return Ok(None);
        };
        let snapshot: TournamentSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(Self::from_snapshot(snapshot)))
    }
}
