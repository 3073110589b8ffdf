//! Application context.
//!
//! [`NotesApp`] is created once at startup and owns all mutable application state: the
//! credential store and the notes engine, both sharing one [`Storage`] handle. It is dropped
//! at exit; every mutation has already been written through by then.

use crate::auth::CredentialStore;
use crate::config::CoreConfig;
use crate::guard::{guard, GuardDecision};
use crate::notes::NotesEngine;
use crate::CoreResult;
use notes_storage::{FileBackend, Storage};
use std::sync::Arc;

#[derive(Debug)]
pub struct NotesApp {
    storage: Storage,
    auth: CredentialStore,
    notes: NotesEngine,
}

impl NotesApp {
    /// Opens the file-backed store described by `config` and loads its state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Storage`] if the data directory cannot be created or is
    /// not a directory.
    pub fn open(config: &CoreConfig) -> CoreResult<Self> {
        let backend = FileBackend::new(config.data_dir())?;
        let storage = Storage::new(config.storage_prefix(), Arc::new(backend))
            .with_max_entry_bytes(config.max_entry_bytes());

        tracing::debug!(
            data_dir = %config.data_dir().display(),
            prefix = config.storage_prefix(),
            "opening notes store"
        );
        Ok(Self::with_storage(storage))
    }

    /// Builds the context over an existing storage handle and loads its state.
    pub fn with_storage(storage: Storage) -> Self {
        Self::from_parts(
            storage.clone(),
            CredentialStore::new(storage.clone()),
            NotesEngine::new(storage),
        )
    }

    /// Assembles a context from pre-built components, then loads the notes engine.
    ///
    /// All components should share the same storage namespace.
    pub fn from_parts(storage: Storage, auth: CredentialStore, mut notes: NotesEngine) -> Self {
        notes.init();
        Self {
            storage,
            auth,
            notes,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn auth(&self) -> &CredentialStore {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut CredentialStore {
        &mut self.auth
    }

    pub fn notes(&self) -> &NotesEngine {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NotesEngine {
        &mut self.notes
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Applies the navigation guard to `path` using the current authentication state.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        let decision = guard(self.is_authenticated(), path);
        if let GuardDecision::Redirect(to) = decision {
            tracing::debug!(from = path, to, "navigation redirected");
        }
        decision
    }
}
