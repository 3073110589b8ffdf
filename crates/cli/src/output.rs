//! Human-readable and JSON rendering for command results.

use chrono::SecondsFormat;
use notes_core::{Counts, Folder, Note, NotesEngine};
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn folder_name<'a>(engine: &'a NotesEngine, note: &Note) -> Option<&'a str> {
    note.folder_id
        .as_deref()
        .and_then(|id| engine.folder(id))
        .map(|f| f.name.as_str())
}

fn tag_list(note: &Note) -> String {
    note.tags
        .iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per note: pin marker, id, timestamp, title, folder and tags.
pub fn note_line(engine: &NotesEngine, note: &Note) -> String {
    let mut line = format!(
        "{} {}  {}  {}",
        if note.pinned { "*" } else { " " },
        note.id,
        note.last_modified().format("%Y-%m-%d %H:%M"),
        note.title
    );
    if let Some(folder) = folder_name(engine, note) {
        line.push_str(&format!("  [{folder}]"));
    }
    if !note.tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tag_list(note));
    }
    line
}

pub fn note_detail(engine: &NotesEngine, note: &Note) {
    println!("{}", note.title);
    println!("id:       {}", note.id);
    println!(
        "created:  {}",
        note.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    if let Some(updated) = note.updated_at {
        println!(
            "updated:  {}",
            updated.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    println!("pinned:   {}", if note.pinned { "yes" } else { "no" });
    println!("folder:   {}", folder_name(engine, note).unwrap_or("-"));
    println!(
        "tags:     {}",
        if note.tags.is_empty() {
            "-".to_owned()
        } else {
            tag_list(note)
        }
    );
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
}

pub fn folder_line(folder: &Folder, notes: usize) -> String {
    format!("{}  {}  ({notes})", folder.id, folder.name)
}

pub fn counts_line(counts: Counts) -> String {
    format!(
        "all: {}  pinned: {}  untagged: {}",
        counts.all, counts.pinned, counts.untagged
    )
}
