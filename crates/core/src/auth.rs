//! Single-account credential store.
//!
//! At most one account exists per storage namespace. Holding a session whose user id matches
//! the stored account is the only authentication signal; sessions never expire.
//!
//! Credentials are a local demo mechanism: the password hash is an unsalted SHA-256 of the
//! email and password and is kept in the same store as the notes.

use crate::constants::{PASSWORD_HASH_SEPARATOR, SESSION_KEY, USER_KEY};
use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Utc};
use notes_id::{IdGenerator, RandomIds};
use notes_storage::Storage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session tied to [`User::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Hex-encoded SHA-256 of `"{email}::{password}"`.
pub fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(PASSWORD_HASH_SEPARATOR.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct CredentialStore {
    storage: Storage,
    user: Option<User>,
    session: Option<Session>,
    ids: Box<dyn IdGenerator>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store and loads any persisted account and session.
    pub fn new(storage: Storage) -> Self {
        let mut store = Self {
            storage,
            user: None,
            session: None,
            ids: Box::new(RandomIds),
        };
        store.reload();
        store
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replaces in-memory state with whatever storage currently holds.
    pub fn reload(&mut self) {
        self.user = self.storage.get(USER_KEY, None);
        self.session = self.storage.get(SESSION_KEY, None);
    }

    /// Creates the account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AlreadyExists`] if storage already holds an account.
    pub fn register(&mut self, email: &str, password: &str) -> AuthResult<()> {
        let existing: Option<User> = self.storage.get(USER_KEY, None);
        if existing.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let user = User {
            id: self.ids.next_id(),
            email: email.to_owned(),
            password_hash: hash_password(email, password),
            created_at: Utc::now(),
        };
        self.storage.set(USER_KEY, &user);
        self.start_session(&user);

        tracing::info!(user_id = %user.id, "account registered");
        self.user = Some(user);
        Ok(())
    }

    /// Signs in the stored account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if no account is stored.
    /// - [`AuthError::InvalidCredentials`] if the email or password does not match.
    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<()> {
        let Some(user) = self.storage.get::<Option<User>>(USER_KEY, None) else {
            return Err(AuthError::NotFound);
        };

        if user.email != email || user.password_hash != hash_password(email, password) {
            tracing::info!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(&user);
        tracing::info!(user_id = %user.id, "signed in");
        self.user = Some(user);
        Ok(())
    }

    /// Ends the session. The account stays registered.
    pub fn logout(&mut self) {
        self.storage.remove(SESSION_KEY);
        self.session = None;
        tracing::info!("signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        match (&self.session, &self.user) {
            (Some(session), Some(user)) => !session.token.is_empty() && session.user_id == user.id,
            _ => false,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn start_session(&mut self, user: &User) {
        let session = Session {
            token: self.ids.next_id(),
            user_id: user.id.clone(),
            created_at: Utc::now(),
        };
        self.storage.set(SESSION_KEY, &session);
        self.session = Some(session);
    }
}
