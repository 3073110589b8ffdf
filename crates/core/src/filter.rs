//! Derived views over the notes collection.
//!
//! Everything here is a pure function of its inputs. The engine calls these on every read,
//! so a view can never lag behind the collection it was computed from.

use crate::models::{Counts, FilterState, Note};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// True when `note` satisfies every active predicate in `filters`.
///
/// Predicates are checked in a fixed order: search, folder, tag, pinned, untagged.
pub fn matches(note: &Note, filters: &FilterState) -> bool {
    matches_query(note, filters, search_query(filters).as_deref())
}

/// The lowercased search text, or `None` when search is inactive.
fn search_query(filters: &FilterState) -> Option<String> {
    (!filters.search.is_empty()).then(|| filters.search.to_lowercase())
}

/// [`matches`] with the search text already lowercased.
fn matches_query(note: &Note, filters: &FilterState, query: Option<&str>) -> bool {
    if let Some(query) = query {
        if !matches_search(note, query) {
            return false;
        }
    }
    if let Some(folder_id) = filters.active_folder() {
        if note.folder_id.as_deref() != Some(folder_id) {
            return false;
        }
    }
    if let Some(tag) = filters.active_tag() {
        if !note.has_tag(tag) {
            return false;
        }
    }
    if let Some(pinned) = filters.pinned {
        if note.pinned != pinned {
            return false;
        }
    }
    if filters.untagged && !note.is_untagged() {
        return false;
    }
    true
}

/// `query` must already be lowercased.
fn matches_search(note: &Note, query: &str) -> bool {
    note.title.to_lowercase().contains(query)
        || note.content.to_lowercase().contains(query)
        || note
            .tags
            .iter()
            .any(|t| t.as_str().to_lowercase().contains(query))
}

/// Display order: pinned before unpinned, then most recently modified first.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.last_modified().cmp(&a.last_modified()))
}

/// Notes satisfying `filters`, in display order.
///
/// The sort is stable, so notes with equal pin state and timestamp keep collection order.
pub fn filtered_notes<'a>(notes: &'a [Note], filters: &FilterState) -> Vec<&'a Note> {
    let query = search_query(filters);
    let mut out: Vec<&Note> = notes
        .iter()
        .filter(|n| matches_query(n, filters, query.as_deref()))
        .collect();
    out.sort_by(|a, b| display_order(a, b));
    out
}

/// Every tag in use, de-duplicated and sorted by byte order.
pub fn unique_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|n| n.tags.iter().map(|t| t.as_str()))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

pub fn counts(notes: &[Note]) -> Counts {
    Counts {
        all: notes.len(),
        pinned: notes.iter().filter(|n| n.pinned).count(),
        untagged: notes.iter().filter(|n| n.is_untagged()).count(),
    }
}
