//! Persistent profile: a flat map of JSON values under well-known keys.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod keys {
    pub const BASIC_INFO: &str = "step-basic-info";
    pub const INCOMES: &str = "step-incomes";
    pub const DEDUCTIONS: &str = "step-deductions";
    pub const TAX: &str = "step-tax";
    pub const DOCUMENTS: &str = "step-documents";
    pub const JOURNAL: &str = "kakutei.blue.entries.v1";
    pub const LEDGER_SUMMARY: &str = "kakutei.blue.summary";
    pub const SNAPSHOT: &str = "outputs.snapshot";
    /// Fingerprint of the last snapshot assembled automatically.
    pub const SNAPSHOT_AUTO: &str = "outputs.snapshot.auto";

    pub const ALL: &[&str] = &[
        BASIC_INFO,
        INCOMES,
        DEDUCTIONS,
        TAX,
        DOCUMENTS,
        JOURNAL,
        LEDGER_SUMMARY,
        SNAPSHOT,
        SNAPSHOT_AUTO,
    ];
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write profile {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

/// Key-value persistence for the filing profile.
///
/// Reads never fail: a value that is missing or cannot be decoded into the
/// requested type is `None`, and callers fall back to their defaults.
pub trait KeyValueStore {
    fn get_value(&self, key: &str) -> Option<&Value>;

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// `false` until persisted values have been loaded. Nothing should be
    /// written back before then.
    fn is_hydrated(&self) -> bool;

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(err) => {
                log::warn!("ignoring stored value for '{}': {}", key, err);
                None
            }
        }
    }

    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_value(key, value)
    }
}

/// In-memory store, hydrated from the start.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }

    fn is_hydrated(&self) -> bool {
        true
    }
}

/// A profile kept as one JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Map<String, Value>,
    hydrated: bool,
}

impl FileStore {
    /// Bind to `path` without reading it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            values: Map::new(),
            hydrated: false,
        }
    }

    /// Load persisted values. A missing file is an empty profile; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = FileStore::new(path);
        store.hydrate();
        store
    }

    pub fn hydrate(&mut self) {
        self.values = match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("profile {} is not a JSON object, starting empty", self.path.display());
                    Map::new()
                }
                Err(err) => {
                    log::warn!("profile {} is malformed ({}), starting empty", self.path.display(), err);
                    Map::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(err) => {
                log::warn!("cannot read profile {}: {}", self.path.display(), err);
                Map::new()
            }
        };
        log::debug!("loaded {} keys from {}", self.values.len(), self.path.display());
        self.hydrated = true;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if !self.hydrated {
            log::warn!("profile {} not loaded yet, skipping write", self.path.display());
            return Ok(());
        }
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|err| write_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        fs::write(&self.path, json).map_err(write_error)
    }
}

impl KeyValueStore for FileStore {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn is_hydrated(&self) -> bool {
        self.hydrated
    }
}
