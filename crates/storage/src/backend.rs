//! Storage backends.
//!
//! A backend stores raw string values under fully prefixed keys. It knows nothing about
//! JSON, fallbacks, or quotas; those belong to [`crate::Storage`].

use crate::constants::ENTRY_FILE_EXTENSION;
use crate::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Raw key-value operations over a persistent (or process-local) store.
pub trait StorageBackend: Debug + Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Process-local backend. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store holding one file per key.
///
/// # Layout
///
/// ```text
/// <directory>/
/// ├── notesapp_3anotes.json
/// ├── notesapp_3afolders.json
/// └── notesapp_3auser.json
/// ```
///
/// File names are derived from the full key: ASCII letters, digits, `-` and `.` are kept,
/// every other byte becomes `_` followed by two lowercase hex digits. The mapping is
/// injective, so distinct keys never share a file.
///
/// Writes go to a sibling temporary file which is then renamed over the target, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    /// Opens (creating if needed) a file backend rooted at `directory`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if:
    /// - the directory cannot be created (I/O)
    /// - the path exists but is not a directory
    /// - path canonicalisation fails
    pub fn new(directory: &Path) -> StorageResult<Self> {
        fs::create_dir_all(directory).map_err(|e| {
            StorageError::InvalidDirectory(format!(
                "Cannot create directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        if !directory.is_dir() {
            return Err(StorageError::InvalidDirectory(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        let directory = directory.canonicalize().map_err(|e| {
            StorageError::InvalidDirectory(format!(
                "Cannot canonicalize path {}: {}",
                directory.display(),
                e
            ))
        })?;

        Ok(Self { directory })
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Computes the file path holding `key`.
    #[must_use]
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", encode_key(key), ENTRY_FILE_EXTENSION))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let target = self.entry_path(key);
        let staging = target.with_extension(format!("{}.tmp", ENTRY_FILE_EXTENSION));

        let mut file = fs::File::create(&staging)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => out.push(char::from(byte)),
            _ => out.push_str(&format!("_{:02x}", byte)),
        }
    }
    out
}
