//! Notes Key-Value Storage
//!
//! This crate provides the persistent key-value layer for the notes organiser.
//!
//! ## Design Principles
//!
//! - Every logical key is namespaced as `<prefix>:<key>`
//! - Values are JSON documents, one per key, always written whole (no partial updates)
//! - Callers never see storage failures: reads fall back to a caller-supplied default and
//!   writes become no-ops, with the failure logged through `tracing`
//! - Storage may be entirely unavailable (for example when rendering without a persistent
//!   store); every operation stays safe to call in that state
//!
//! ## Backends
//!
//! ```text
//! Storage (prefix, quota, fallback handling)
//!  └── dyn StorageBackend
//!       ├── MemoryBackend   # process-local map
//!       └── FileBackend     # <dir>/<encoded key>.json
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use notes_storage::{FileBackend, Storage};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = FileBackend::new(Path::new("notes_data"))?;
//! let storage = Storage::new("notesapp", Arc::new(backend));
//!
//! storage.set("folders", &vec!["inbox"]);
//! let folders: Vec<String> = storage.get("folders", Vec::new());
//! # Ok(())
//! # }
//! ```

mod backend;
mod constants;
mod storage;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use constants::{DEFAULT_MAX_ENTRY_BYTES, ENTRY_FILE_EXTENSION, KEY_SEPARATOR};
pub use storage::Storage;

/// Errors that can occur inside a storage backend.
///
/// These are surfaced by backends and by [`Storage::try_get`] / [`Storage::try_set`]; the
/// infallible [`Storage`] operations log and swallow them.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No persistent store is available in this environment
    #[error("Storage unavailable")]
    Unavailable,

    /// Entry would exceed the configured per-entry quota
    #[error("Quota exceeded for key {key}: {size} bytes (limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    /// Backend directory is unusable
    #[error("Invalid storage directory: {0}")]
    InvalidDirectory(String),

    /// Backend lock was poisoned by a panicking writer
    #[error("Storage backend lock poisoned")]
    Poisoned,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded as JSON
    #[error("failed to serialize value: {0}")]
    Serialization(serde_json::Error),

    /// Stored value was not valid JSON for the requested type
    #[error("failed to deserialize value: {0}")]
    Deserialization(serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
