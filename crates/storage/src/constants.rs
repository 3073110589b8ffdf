/// Default per-entry size limit, matching the usual browser storage quota.
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 5 * 1024 * 1024;

/// Extension given to every entry written by the file backend.
pub const ENTRY_FILE_EXTENSION: &str = "json";

/// Separator between the namespace prefix and the logical key.
pub const KEY_SEPARATOR: char = ':';
