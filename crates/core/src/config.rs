//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in the core reads environment variables while handling an operation; the binary
//! gathers the raw values and hands them to [`CoreConfig::from_env_values`].

use crate::constants::{DEFAULT_APP_NAME, DEFAULT_DATA_DIR, DEFAULT_STORAGE_PREFIX};
use crate::{CoreError, CoreResult};
use notes_storage::DEFAULT_MAX_ENTRY_BYTES;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    data_dir: PathBuf,
    storage_prefix: String,
    app_name: String,
    max_entry_bytes: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `storage_prefix` or `app_name` is blank, or
    /// if `max_entry_bytes` is zero.
    pub fn new(
        data_dir: PathBuf,
        storage_prefix: String,
        app_name: String,
        max_entry_bytes: usize,
    ) -> CoreResult<Self> {
        if storage_prefix.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "storage_prefix cannot be empty".into(),
            ));
        }
        if app_name.trim().is_empty() {
            return Err(CoreError::InvalidConfig("app_name cannot be empty".into()));
        }
        if max_entry_bytes == 0 {
            return Err(CoreError::InvalidConfig(
                "max_entry_bytes must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            storage_prefix: storage_prefix.trim().to_owned(),
            app_name: app_name.trim().to_owned(),
            max_entry_bytes,
        })
    }

    /// Build a configuration from optional raw values (typically environment variables).
    ///
    /// Missing or blank values take their defaults.
    pub fn from_env_values(
        data_dir: Option<String>,
        storage_prefix: Option<String>,
        app_name: Option<String>,
        max_entry_bytes: Option<String>,
    ) -> CoreResult<Self> {
        let data_dir = non_blank(data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let storage_prefix =
            non_blank(storage_prefix).unwrap_or_else(|| DEFAULT_STORAGE_PREFIX.to_owned());
        let app_name = non_blank(app_name).unwrap_or_else(|| DEFAULT_APP_NAME.to_owned());
        let max_entry_bytes = max_entry_bytes_from_env_value(max_entry_bytes)?;

        Self::new(data_dir, storage_prefix, app_name, max_entry_bytes)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn storage_prefix(&self) -> &str {
        &self.storage_prefix
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry_bytes
    }

    /// Returns a copy with a different data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Returns a copy with a different storage prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `prefix` is blank.
    pub fn with_storage_prefix(mut self, prefix: &str) -> CoreResult<Self> {
        if prefix.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "storage_prefix cannot be empty".into(),
            ));
        }
        self.storage_prefix = prefix.trim().to_owned();
        Ok(self)
    }
}

/// Parse the per-entry storage quota from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default quota.
pub fn max_entry_bytes_from_env_value(value: Option<String>) -> CoreResult<usize> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_MAX_ENTRY_BYTES);
    };

    value.parse::<usize>().map_err(|e| {
        CoreError::InvalidConfig(format!(
            "max_entry_bytes must be a positive integer, got '{}': {}",
            value, e
        ))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
