#![deny(warnings)]

//! Persistence layer: the string key-value medium that trackers save into.
//!
//! Stores only ever see opaque text documents. [`MemoryStore`] is the in-process
//! fake used by tests; [`JsonFileStore`] keeps every key in one JSON object on
//! disk, the native stand-in for browser local storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by a key-value medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing document exists but is not a JSON object of strings.
    #[error("corrupt store at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    /// The medium refused the operation (quota, read-only, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Capability interface over a string key-value medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Returns the default path of the on-disk store used by the CLI.
pub fn default_store_path() -> &'static str {
    "relic_store.json"
}

/// In-memory medium that counts successful writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
    reject_reads: bool,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent `get` fail, as a blocked medium would.
    pub fn reject_reads(&mut self, reject: bool) {
        self.reject_reads = reject;
    }

    /// Make every subsequent `set` fail, as a full quota would.
    pub fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.reject_reads {
            return Err(StoreError::Unavailable(format!("read of {key} rejected")));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Unavailable(format!("write to {key} rejected")));
        }
        self.entries.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// File-backed medium: one JSON object mapping key to document text.
///
/// The whole file is rewritten on every `set`, through a temporary sibling
/// file that is renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.entries).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            // keep memory and disk in agreement
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        debug!(key, path = %self.path.display(), "persisted");
        Ok(())
    }
}
