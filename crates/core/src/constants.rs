//! Constants used throughout the notes core crate.
//!
//! Storage keys, default configuration values and navigation paths live here so every
//! component agrees on them.

/// Storage key for the single registered account.
pub const USER_KEY: &str = "user";

/// Storage key for the current session record.
pub const SESSION_KEY: &str = "session";

/// Storage key for the notes collection.
pub const NOTES_KEY: &str = "notes";

/// Storage key for the folders collection.
pub const FOLDERS_KEY: &str = "folders";

/// Title given to freshly created notes.
pub const NEW_NOTE_TITLE: &str = "New Note";

/// Default namespace prefix for storage keys.
pub const DEFAULT_STORAGE_PREFIX: &str = "notesapp";

/// Default application name.
pub const DEFAULT_APP_NAME: &str = "Simple Notes";

/// Default directory for the file-backed store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "notes_data";

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

/// Path authenticated users are sent to when they open the login view.
pub const HOME_PATH: &str = "/";

/// Separator between email and password in the credential hash input.
pub const PASSWORD_HASH_SEPARATOR: &str = "::";
