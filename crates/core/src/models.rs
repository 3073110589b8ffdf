//! Persistent and view-level data types.
//!
//! Field names serialize in camelCase (`createdAt`, `updatedAt`, `folderId`) so stored
//! collections keep the same JSON layout across versions of the application.

use crate::tags::normalize_tags;
use chrono::{DateTime, Utc};
use notes_types::NonEmptyText;
use serde::{Deserialize, Deserializer, Serialize};

/// A user-authored text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Never contains duplicates; blanks are unrepresentable.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<NonEmptyText>,
    /// Soft reference to a [`Folder`].
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

impl Note {
    /// Timestamp used for display ordering: the update time if present, else creation time.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }
}

/// Reads stored tags leniently: blank, untrimmed and duplicate entries are normalised
/// away instead of rejecting the note. `null` reads as no tags.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<NonEmptyText>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(normalize_tags(raw.unwrap_or_default()))
}

/// A named grouping bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// Partial update for a [`Note`], keyed by `id`.
///
/// Every `Some` field overwrites the matching note field. `folder_id` is doubly optional:
/// `Some(None)` clears the folder, `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub folder_id: Option<Option<String>>,
    pub pinned: Option<bool>,
}

impl NotePatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn folder(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }
}

/// A whole note used as a patch replaces every editable field.
impl From<Note> for NotePatch {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: Some(note.title),
            content: Some(note.content),
            created_at: Some(note.created_at),
            tags: Some(note.tags.into_iter().map(NonEmptyText::into_inner).collect()),
            folder_id: Some(note.folder_id),
            pinned: Some(note.pinned),
        }
    }
}

/// Active predicates narrowing the displayed note list. All active predicates are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Case-insensitive substring over title, content and tags; active when non-empty.
    pub search: String,
    pub folder_id: Option<String>,
    pub tag: Option<String>,
    /// Tri-state: `None` means "don't care".
    pub pinned: Option<bool>,
    pub untagged: bool,
}

impl FilterState {
    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && active(&self.folder_id).is_none()
            && active(&self.tag).is_none()
            && self.pinned.is_none()
            && !self.untagged
    }

    pub(crate) fn active_folder(&self) -> Option<&str> {
        active(&self.folder_id)
    }

    pub(crate) fn active_tag(&self) -> Option<&str> {
        active(&self.tag)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Sidebar counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub all: usize,
    pub pinned: usize,
    pub untagged: usize,
}
