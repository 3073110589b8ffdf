//! # Notes Core
//!
//! Domain logic for the notes organiser:
//! - [`NotesEngine`]: notes and folders, tags, pinning, filtering and derived views
//! - [`CredentialStore`]: the single local account and its session
//! - [`guard()`]: navigation rules keyed on the authentication signal
//! - [`NotesApp`]: the context object that owns all of the above
//!
//! Everything persists through [`notes_storage::Storage`]. Storage failures are logged and
//! absorbed there, so nothing in this crate returns an error for a failed write.
//!
//! **No presentation concerns**: rendering, prompts and output formatting belong in the CLI.

pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod guard;
pub mod models;
pub mod notes;
pub mod tags;

pub use app::NotesApp;
pub use auth::{hash_password, CredentialStore, Session, User};
pub use config::CoreConfig;
pub use error::{AuthError, AuthResponse, AuthResult, CoreError, CoreResult};
pub use guard::{guard, GuardDecision};
pub use models::{Counts, FilterState, Folder, Note, NotePatch};
pub use notes::{Clock, NotesEngine};
pub use tags::normalize_tags;
