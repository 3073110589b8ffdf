//! Internal implementation of identifier generation.

use crate::{IdError, IdResult};
use chrono::Utc;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a new identifier.
///
/// Uses the OS random source when it is readable and returns the canonical 32-character
/// lowercase hex form. Otherwise logs a warning and returns [`fallback_id`].
pub fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .simple()
            .to_string(),
        Err(e) => {
            tracing::warn!("os random source unavailable, using weak identifier: {}", e);
            fallback_id()
        }
    }
}

/// Generates a weak identifier from a seeded pseudo-random value and the current timestamp.
///
/// The seed mixes the nanosecond clock with a process-wide counter, so two calls within the
/// same clock tick still diverge.
pub fn fallback_id() -> String {
    let now = Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_default() as u64;
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut rng = StdRng::seed_from_u64(nanos ^ counter.rotate_left(32));
    let random: u64 = rng.gen();
    let millis = now.timestamp_millis().max(0) as u64;

    format!("{}{}", to_base36(random), to_base36(millis))
}

/// Returns `value` when it is a non-blank identifier, otherwise a freshly generated one.
pub fn ensure_id(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(existing) => existing.to_owned(),
        None => generate_id(),
    }
}

/// Validates an externally supplied identifier (CLI argument, stored reference).
///
/// Identifiers are opaque, so the only requirement is that the trimmed value is non-empty
/// and contains no whitespace.
///
/// # Errors
///
/// Returns [`IdError::InvalidInput`] for blank input or input with inner whitespace.
pub fn parse_id(input: &str) -> IdResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdError::InvalidInput("identifier cannot be empty".into()));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(IdError::InvalidInput(format!(
            "identifier must not contain whitespace, got: '{}'",
            trimmed
        )));
    }
    Ok(trimmed.to_owned())
}

/// Returns true if `input` is in the canonical identifier form.
///
/// Canonical means exactly 32 bytes, all of them `0-9` or `a-f`.
pub fn is_canonical(input: &str) -> bool {
    input.len() == 32
        && input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".into();
    }

    let mut out = Vec::with_capacity(13);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Source of fresh identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Default generator backed by [`generate_id`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        generate_id()
    }
}

/// Deterministic generator producing `<prefix>1`, `<prefix>2`, ...
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id-")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
