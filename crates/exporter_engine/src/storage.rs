use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use exporter_logging::export_warn;
use serde_json::Value;
use thiserror::Error;

use crate::persist::AtomicFileWriter;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write rejected: {0}")]
    Write(String),
}

/// A durable key-value area, mirroring the host storage areas the background
/// worker leans on. Whole values are read and replaced; last writer wins.
pub trait StorageArea: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Session-scoped area: lives as long as the process, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Read("storage mutex poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Write("storage mutex poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Write("storage mutex poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Read("storage mutex poisoned".to_string()))?;
        Ok(entries.keys().cloned().collect())
    }
}

/// Longer-lived area backed by a single JSON object file, written
/// atomically. Missing or corrupt files read back as empty.
pub struct JsonFileStore {
    dir: PathBuf,
    filename: String,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf, filename: impl Into<String>) -> Self {
        Self {
            dir,
            filename: filename.into(),
        }
    }

    fn load(&self) -> BTreeMap<String, Value> {
        let path = self.dir.join(&self.filename);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return BTreeMap::new();
            }
            Err(err) => {
                export_warn!("Failed to read storage file {:?}: {}", path, err);
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                export_warn!("Failed to parse storage file {:?}: {}", path, err);
                BTreeMap::new()
            }
        }
    }

    fn store(&self, entries: &BTreeMap<String, Value>) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(entries).map_err(|e| StorageError::Write(e.to_string()))?;
        let writer = AtomicFileWriter::new(self.dir.clone());
        writer
            .write(Path::new(&self.filename), &content)
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }
}

impl StorageArea for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value);
        self.store(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load();
        entries.remove(key);
        self.store(&entries)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.load().keys().cloned().collect())
    }
}

/// Session-scoped store preferred, longer-lived fallback. Reads consult the
/// primary first; writes the primary rejects land in the fallback instead.
pub struct TieredStore {
    primary: Arc<dyn StorageArea>,
    fallback: Arc<dyn StorageArea>,
}

impl TieredStore {
    pub fn new(primary: Arc<dyn StorageArea>, fallback: Arc<dyn StorageArea>) -> Self {
        Self { primary, fallback }
    }
}

impl StorageArea for TieredStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self.primary.get(key) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.fallback.get(key),
            Err(err) => {
                export_warn!("primary storage read failed for {key}: {err}");
                self.fallback.get(key)
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        match self.primary.set(key, value.clone()) {
            Ok(()) => Ok(()),
            Err(err) => {
                export_warn!("primary storage rejected {key}: {err}, using fallback");
                self.fallback.set(key, value)
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        // Clear both tiers so a stale fallback copy cannot resurface.
        let primary = self.primary.remove(key);
        let fallback = self.fallback.remove(key);
        match (primary, fallback) {
            (Err(err), Err(_)) => Err(err),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: BTreeSet<String> = BTreeSet::new();
        match self.primary.keys() {
            Ok(primary) => keys.extend(primary),
            Err(err) => export_warn!("primary storage key listing failed: {err}"),
        }
        keys.extend(self.fallback.keys()?);
        Ok(keys.into_iter().collect())
    }
}
