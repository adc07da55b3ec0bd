//! Opaque key/value persistence.
//!
//! Everything chitchat persists (history, selected provider, API keys) goes
//! through [`KeyValueStore`]. Values are plain strings; callers own the
//! encoding.

pub mod file;
pub mod keyring;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

pub use self::file::FileStore;
pub use self::keyring::{KeyringAccessError, KeyringStore};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Encoding the store contents failed.
    Encode(serde_json::Error),

    /// The platform keyring refused the operation.
    Keyring(KeyringAccessError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "Failed to access store at {}: {}", path.display(), source)
            }
            StoreError::Parse { path, source } => {
                write!(f, "Failed to parse store at {}: {}", path.display(), source)
            }
            StoreError::Encode(source) => write!(f, "Failed to encode store: {source}"),
            StoreError::Keyring(source) => write!(f, "Keyring error: {source}"),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Parse { source, .. } => Some(source),
            StoreError::Encode(source) => Some(source),
            StoreError::Keyring(source) => Some(source),
        }
    }
}

impl From<KeyringAccessError> for StoreError {
    fn from(err: KeyringAccessError) -> Self {
        StoreError::Keyring(err)
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
