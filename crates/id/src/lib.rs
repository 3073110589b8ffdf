//! Identifier generation for notes, folders, users and sessions.
//!
//! Identifiers are opaque strings. The preferred form is the *canonical* one:
//! **32 lowercase hexadecimal characters** drawn from the operating system's
//! cryptographically strong random source, laid out as a version 4 UUID in simple form.
//!
//! ## Fallback form
//! When the OS random source cannot be read, a weaker identifier is produced instead:
//! a base-36 pseudo-random value followed by the base-36 millisecond timestamp
//! (for example `k3j9x0q1ab4lm2nz`). Such identifiers are still unique in practice for a
//! single-user store, but they are not canonical.
//!
//! Callers must treat every identifier as opaque: stored data may contain either form.
//!
//! ## Generators
//! Components that allocate identifiers take an [`IdGenerator`] so tests can substitute
//! [`SequentialIds`] for the default [`RandomIds`].

mod service;

pub use service::{
    ensure_id, fallback_id, generate_id, is_canonical, parse_id, IdGenerator, RandomIds,
    SequentialIds,
};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
