//! Prefixed, failure-tolerant key-value facade.

use crate::backend::{MemoryBackend, StorageBackend};
use crate::constants::{DEFAULT_MAX_ENTRY_BYTES, KEY_SEPARATOR};
use crate::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// JSON key-value storage scoped to a namespace prefix.
///
/// Cloning a `Storage` is cheap and yields a handle onto the same backend, so the
/// credential store and the notes engine can each hold one.
///
/// A `Storage` without a backend models an environment with no persistent store: reads
/// return the fallback and writes do nothing.
#[derive(Clone, Debug)]
pub struct Storage {
    prefix: String,
    backend: Option<Arc<dyn StorageBackend>>,
    max_entry_bytes: usize,
}

impl Storage {
    pub fn new(prefix: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            prefix: prefix.into(),
            backend: Some(backend),
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }

    /// Storage backed by a fresh [`MemoryBackend`].
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Arc::new(MemoryBackend::new()))
    }

    /// Storage with no backend at all.
    pub fn unavailable(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            backend: None,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }

    /// Sets the largest serialized entry (key plus value, in bytes) that will be accepted.
    #[must_use]
    pub fn with_max_entry_bytes(mut self, max_entry_bytes: usize) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry_bytes
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns the namespaced form of `key`.
    pub fn key(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, KEY_SEPARATOR, key)
    }

    /// Reads and decodes `key`, returning `fallback` on any failure.
    ///
    /// Absent, empty, and malformed entries all yield `fallback`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(StorageError::Unavailable) => fallback,
            Err(e) => {
                tracing::warn!("storage read for '{}' failed, using fallback: {}", key, e);
                fallback
            }
        }
    }

    /// Encodes and writes `value` under `key`. Failures are logged and ignored.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match self.try_set(key, value) {
            Ok(()) | Err(StorageError::Unavailable) => {}
            Err(e) => tracing::warn!("storage write for '{}' dropped: {}", key, e),
        }
    }

    /// Removes `key`. Failures are logged and ignored.
    pub fn remove(&self, key: &str) {
        match self.try_remove(key) {
            Ok(()) | Err(StorageError::Unavailable) => {}
            Err(e) => tracing::warn!("storage remove for '{}' failed: {}", key, e),
        }
    }

    /// Fallible read. `Ok(None)` means the entry is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` without a backend, the backend's error on read
    /// failure, or `StorageError::Deserialization` for malformed content.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        let raw = match backend.read(&self.key(key))? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(StorageError::Deserialization)
    }

    /// Fallible write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` without a backend, `StorageError::Serialization`
    /// if encoding fails, `StorageError::QuotaExceeded` for oversized entries, or the
    /// backend's error on write failure.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        let full_key = self.key(key);
        let encoded = serde_json::to_string(value).map_err(StorageError::Serialization)?;

        let size = full_key.len() + encoded.len();
        if size > self.max_entry_bytes {
            return Err(StorageError::QuotaExceeded {
                key: full_key,
                size,
                limit: self.max_entry_bytes,
            });
        }

        backend.write(&full_key, &encoded)
    }

    /// Fallible remove.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` without a backend, or the backend's error.
    pub fn try_remove(&self, key: &str) -> StorageResult<()> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        backend.delete(&self.key(key))
    }
}
