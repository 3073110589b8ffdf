//! Notes & filter engine.
//!
//! [`NotesEngine`] owns the notes and folders collections, the active note, and the filter
//! state. Mutations are synchronous and write the whole affected collection back to storage
//! immediately. Derived views (`filtered_notes`, `unique_tags`, `counts`, `active_note`) are
//! recomputed on every call.
//!
//! Operations that reference an unknown id do nothing.

use crate::constants::{FOLDERS_KEY, NEW_NOTE_TITLE, NOTES_KEY};
use crate::filter;
use crate::models::{Counts, FilterState, Folder, Note, NotePatch};
use crate::tags::normalize_tags;
use chrono::{DateTime, Utc};
use notes_id::{IdGenerator, RandomIds};
use notes_storage::Storage;
use std::fmt;

/// Source of "now" for timestamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct NotesEngine {
    storage: Storage,
    notes: Vec<Note>,
    folders: Vec<Folder>,
    active_note_id: Option<String>,
    filters: FilterState,
    ids: Box<dyn IdGenerator>,
    clock: Clock,
}

impl fmt::Debug for NotesEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotesEngine")
            .field("notes", &self.notes.len())
            .field("folders", &self.folders.len())
            .field("active_note_id", &self.active_note_id)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl NotesEngine {
    /// Creates an empty engine. Call [`NotesEngine::init`] to load persisted state.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            notes: Vec::new(),
            folders: Vec::new(),
            active_note_id: None,
            filters: FilterState::default(),
            ids: Box::new(RandomIds),
            clock: Box::new(Utc::now),
        }
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Loads notes and folders from storage. Absent or unreadable entries load as empty.
    ///
    /// If notes exist and no note is active yet, the first loaded note becomes active.
    pub fn init(&mut self) {
        self.notes = self.storage.get(NOTES_KEY, Vec::new());
        self.folders = self.storage.get(FOLDERS_KEY, Vec::new());

        if self.active_note_id.is_none() {
            self.active_note_id = self.notes.first().map(|n| n.id.clone());
        }

        tracing::debug!(
            notes = self.notes.len(),
            folders = self.folders.len(),
            "notes engine loaded"
        );
    }

    // --- state accessors ---

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn active_note_id(&self) -> Option<&str> {
        self.active_note_id.as_deref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    // --- derived views ---

    pub fn active_note(&self) -> Option<&Note> {
        self.active_note_id.as_deref().and_then(|id| self.note(id))
    }

    pub fn unique_tags(&self) -> Vec<String> {
        filter::unique_tags(&self.notes)
    }

    pub fn counts(&self) -> Counts {
        filter::counts(&self.notes)
    }

    pub fn filtered_notes(&self) -> Vec<&Note> {
        filter::filtered_notes(&self.notes, &self.filters)
    }

    // --- notes ---

    /// Creates an empty note titled "New Note", puts it first, and makes it active.
    ///
    /// Returns the new note's id.
    pub fn create_note(&mut self) -> String {
        let now = self.now();
        let id = self.ids.next_id();

        self.notes.insert(
            0,
            Note {
                id: id.clone(),
                title: NEW_NOTE_TITLE.to_owned(),
                content: String::new(),
                created_at: now,
                updated_at: Some(now),
                tags: Vec::new(),
                folder_id: None,
                pinned: false,
            },
        );
        self.active_note_id = Some(id.clone());
        self.persist_notes();

        tracing::debug!(note_id = %id, "note created");
        id
    }

    /// Merges `patch` into the note with the same id and refreshes its update time.
    ///
    /// Patched tags are normalised the same way as [`NotesEngine::set_tags`].
    pub fn update_note(&mut self, patch: NotePatch) {
        let now = self.now();
        let Some(note) = self.notes.iter_mut().find(|n| n.id == patch.id) else {
            return;
        };

        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(created_at) = patch.created_at {
            note.created_at = created_at;
        }
        if let Some(tags) = patch.tags {
            note.tags = normalize_tags(tags);
        }
        if let Some(folder_id) = patch.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(pinned) = patch.pinned {
            note.pinned = pinned;
        }
        note.updated_at = Some(now);

        self.persist_notes();
    }

    /// Removes a note. If it was active, the new first note (or nothing) becomes active.
    pub fn delete_note(&mut self, id: &str) {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return;
        };

        self.notes.remove(index);
        if self.active_note_id.as_deref() == Some(id) {
            self.active_note_id = self.notes.first().map(|n| n.id.clone());
        }
        self.persist_notes();

        tracing::debug!(note_id = %id, "note deleted");
    }

    /// Sets the active note id without checking that it exists.
    pub fn set_active_note(&mut self, id: impl Into<String>) {
        self.active_note_id = Some(id.into());
    }

    // --- folders ---

    /// Appends a folder and returns its id.
    pub fn add_folder(&mut self, name: impl Into<String>) -> String {
        let id = self.ids.next_id();
        self.folders.push(Folder {
            id: id.clone(),
            name: name.into(),
        });
        self.persist_folders();
        id
    }

    pub fn rename_folder(&mut self, id: &str, name: impl Into<String>) {
        if let Some(folder) = self.folders.iter_mut().find(|f| f.id == id) {
            folder.name = name.into();
            self.persist_folders();
        }
    }

    /// Removes a folder and detaches every note that referenced it.
    ///
    /// Detached notes keep their update time. A folder filter pointing at the removed
    /// folder is cleared.
    pub fn delete_folder(&mut self, id: &str) {
        if let Some(index) = self.folders.iter().position(|f| f.id == id) {
            self.folders.remove(index);
            self.persist_folders();
        }

        let mut detached = 0usize;
        for note in self
            .notes
            .iter_mut()
            .filter(|n| n.folder_id.as_deref() == Some(id))
        {
            note.folder_id = None;
            detached += 1;
        }
        if detached > 0 {
            self.persist_notes();
        }

        if self.filters.folder_id.as_deref() == Some(id) {
            self.filters.folder_id = None;
        }

        tracing::debug!(folder_id = %id, detached, "folder deleted");
    }

    /// Moves a note into `folder_id`, or out of any folder for `None` / an empty id.
    pub fn move_to_folder(&mut self, id: &str, folder_id: Option<&str>) {
        let now = self.now();
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.folder_id = folder_id.filter(|f| !f.is_empty()).map(str::to_owned);
            note.updated_at = Some(now);
            self.persist_notes();
        }
    }

    // --- tags & pin ---

    /// Replaces a note's tags with the trimmed, non-blank, de-duplicated input.
    pub fn set_tags<I, S>(&mut self, id: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = self.now();
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.tags = normalize_tags(tags);
            note.updated_at = Some(now);
            self.persist_notes();
        }
    }

    pub fn toggle_pinned(&mut self, id: &str) {
        let now = self.now();
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
            note.pinned = !note.pinned;
            note.updated_at = Some(now);
            self.persist_notes();
        }
    }

    // --- filters ---

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.search = query.into();
    }

    pub fn set_folder_filter(&mut self, folder_id: Option<String>) {
        self.filters.folder_id = folder_id;
    }

    pub fn clear_folder_filter(&mut self) {
        self.filters.folder_id = None;
    }

    pub fn set_tag_filter(&mut self, tag: Option<String>) {
        self.filters.tag = tag;
    }

    pub fn clear_tag_filter(&mut self) {
        self.filters.tag = None;
    }

    pub fn set_pinned_filter(&mut self, pinned: Option<bool>) {
        self.filters.pinned = pinned;
    }

    /// Restricts the list to untagged notes. Other active filters stay in effect.
    pub fn show_untagged(&mut self) {
        self.filters.untagged = true;
    }

    pub fn clear_all_filters(&mut self) {
        self.filters = FilterState::default();
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn persist_notes(&self) {
        self.storage.set(NOTES_KEY, &self.notes);
    }

    fn persist_folders(&self) {
        self.storage.set(FOLDERS_KEY, &self.folders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use notes_id::SequentialIds;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Engine over in-memory storage whose clock advances one minute per reading.
    fn engine_with(storage: Storage) -> NotesEngine {
        let start: DateTime<Utc> = "2024-06-01T09:00:00Z".parse().unwrap();
        let ticks = Rc::new(Cell::new(0i64));
        NotesEngine::new(storage)
            .with_id_generator(SequentialIds::new("n"))
            .with_clock(move || {
                let t = ticks.get();
                ticks.set(t + 1);
                start + Duration::minutes(t)
            })
    }

    fn engine() -> NotesEngine {
        engine_with(Storage::in_memory("test"))
    }

    fn ids(notes: &[&Note]) -> Vec<String> {
        notes.iter().map(|n| n.id.clone()).collect()
    }

    fn stored_notes(storage: &Storage) -> Vec<Note> {
        storage.get(NOTES_KEY, Vec::new())
    }

    #[test]
    fn test_create_note_defaults() {
        let mut engine = engine();
        let id = engine.create_note();

        let note = engine.active_note().unwrap();
        assert_eq!(note.id, id);
        assert_eq!(note.title, "New Note");
        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert_eq!(note.folder_id, None);
        assert!(!note.pinned);
        assert_eq!(note.updated_at, Some(note.created_at));
    }

    #[test]
    fn test_create_note_prepends_and_activates() {
        let mut engine = engine();
        for expected in 1..=5 {
            let id = engine.create_note();
            assert_eq!(engine.notes().len(), expected);
            assert_eq!(engine.active_note_id(), Some(id.as_str()));
            assert_eq!(engine.notes()[0].id, id);
        }
    }

    #[test]
    fn test_create_note_writes_through() {
        let storage = Storage::in_memory("test");
        let mut engine = engine_with(storage.clone());
        engine.create_note();

        assert_eq!(stored_notes(&storage), engine.notes().to_vec());
    }

    #[test]
    fn test_update_note_merges_fields() {
        let mut engine = engine();
        let id = engine.create_note();
        let created = engine.note(&id).unwrap().updated_at;

        engine.update_note(NotePatch::new(&id).title("Plan").content("body"));

        let note = engine.note(&id).unwrap();
        assert_eq!(note.title, "Plan");
        assert_eq!(note.content, "body");
        assert!(note.updated_at > created);
    }

    #[test]
    fn test_update_note_normalizes_tags() {
        let mut engine = engine();
        let id = engine.create_note();

        engine.update_note(NotePatch::new(&id).tags([" a", "a", "", "b"]));

        let tags: Vec<&str> = engine.note(&id).unwrap().tags.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_update_unknown_note_is_noop() {
        let storage = Storage::in_memory("test");
        let mut engine = engine_with(storage.clone());
        engine.create_note();
        let before = engine.notes().to_vec();

        engine.update_note(NotePatch::new("missing").title("x"));

        assert_eq!(engine.notes(), before.as_slice());
        assert_eq!(stored_notes(&storage), before);
    }

    #[test]
    fn test_delete_active_note_activates_new_first() {
        let mut engine = engine();
        let a = engine.create_note();
        let b = engine.create_note();

        engine.delete_note(&b);
        assert_eq!(engine.active_note_id(), Some(a.as_str()));

        engine.delete_note(&a);
        assert_eq!(engine.active_note_id(), None);
        assert!(engine.notes().is_empty());
    }

    #[test]
    fn test_delete_inactive_note_keeps_active() {
        let mut engine = engine();
        let a = engine.create_note();
        let b = engine.create_note();

        engine.delete_note(&a);
        assert_eq!(engine.active_note_id(), Some(b.as_str()));
    }

    #[test]
    fn test_delete_unknown_note_is_noop() {
        let mut engine = engine();
        let a = engine.create_note();
        engine.delete_note("missing");

        assert_eq!(engine.notes().len(), 1);
        assert_eq!(engine.active_note_id(), Some(a.as_str()));
    }

    #[test]
    fn test_set_active_note_is_unchecked() {
        let mut engine = engine();
        engine.set_active_note("ghost");

        assert_eq!(engine.active_note_id(), Some("ghost"));
        assert!(engine.active_note().is_none());
    }

    #[test]
    fn test_folder_lifecycle() {
        let storage = Storage::in_memory("test");
        let mut engine = engine_with(storage.clone());

        let f = engine.add_folder("Work");
        assert_eq!(engine.folder(&f).unwrap().name, "Work");

        engine.rename_folder(&f, "Projects");
        assert_eq!(engine.folder(&f).unwrap().name, "Projects");

        engine.rename_folder("missing", "Nope");
        let stored: Vec<Folder> = storage.get(FOLDERS_KEY, Vec::new());
        assert_eq!(stored, engine.folders().to_vec());
    }

    #[test]
    fn test_add_folder_appends() {
        let mut engine = engine();
        let first = engine.add_folder("One");
        let second = engine.add_folder("Two");

        let order: Vec<&str> = engine.folders().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, vec![first.as_str(), second.as_str()]);
    }

    #[test]
    fn test_delete_folder_cascades() {
        let mut engine = engine();
        let folder = engine.add_folder("Work");
        let keep = engine.add_folder("Home");
        let a = engine.create_note();
        let b = engine.create_note();
        let c = engine.create_note();
        engine.move_to_folder(&a, Some(folder.as_str()));
        engine.move_to_folder(&b, Some(folder.as_str()));
        engine.move_to_folder(&c, Some(keep.as_str()));
        engine.set_folder_filter(Some(folder.clone()));
        let stamp_before = engine.note(&a).unwrap().updated_at;

        engine.delete_folder(&folder);

        assert!(engine.folder(&folder).is_none());
        assert!(engine
            .notes()
            .iter()
            .all(|n| n.folder_id.as_deref() != Some(folder.as_str())));
        assert_eq!(engine.note(&c).unwrap().folder_id.as_deref(), Some(keep.as_str()));
        assert_eq!(engine.filters().folder_id, None);
        assert_eq!(engine.note(&a).unwrap().updated_at, stamp_before);
    }

    #[test]
    fn test_delete_folder_keeps_unrelated_filter() {
        let mut engine = engine();
        let gone = engine.add_folder("Gone");
        let kept = engine.add_folder("Kept");
        engine.set_folder_filter(Some(kept.clone()));

        engine.delete_folder(&gone);
        assert_eq!(engine.filters().folder_id.as_deref(), Some(kept.as_str()));
    }

    #[test]
    fn test_move_to_folder() {
        let mut engine = engine();
        let folder = engine.add_folder("Inbox");
        let id = engine.create_note();
        let before = engine.note(&id).unwrap().updated_at;

        engine.move_to_folder(&id, Some(folder.as_str()));
        let note = engine.note(&id).unwrap();
        assert_eq!(note.folder_id.as_deref(), Some(folder.as_str()));
        assert!(note.updated_at > before);

        engine.move_to_folder(&id, Some(""));
        assert_eq!(engine.note(&id).unwrap().folder_id, None);

        engine.move_to_folder(&id, Some(folder.as_str()));
        engine.move_to_folder(&id, None);
        assert_eq!(engine.note(&id).unwrap().folder_id, None);
    }

    #[test]
    fn test_set_tags_is_idempotent() {
        let mut engine = engine();
        let id = engine.create_note();

        engine.set_tags(&id, ["work", " work ", "", "  ", "ideas", "Work"]);
        let first = engine.note(&id).unwrap().tags.clone();
        engine.set_tags(&id, ["work", " work ", "", "  ", "ideas", "Work"]);
        let second = engine.note(&id).unwrap().tags.clone();

        let tags: Vec<&str> = first.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags, vec!["work", "ideas", "Work"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_toggle_pinned() {
        let mut engine = engine();
        let id = engine.create_note();

        engine.toggle_pinned(&id);
        assert!(engine.note(&id).unwrap().pinned);
        assert_eq!(engine.counts().pinned, 1);

        engine.toggle_pinned(&id);
        assert!(!engine.note(&id).unwrap().pinned);
    }

    #[test]
    fn test_filter_mutators() {
        let mut engine = engine();

        engine.set_search("abc");
        engine.set_folder_filter(Some("f".into()));
        engine.set_tag_filter(Some("t".into()));
        engine.set_pinned_filter(Some(true));
        engine.show_untagged();
        assert_eq!(
            engine.filters(),
            &FilterState {
                search: "abc".into(),
                folder_id: Some("f".into()),
                tag: Some("t".into()),
                pinned: Some(true),
                untagged: true,
            }
        );

        engine.clear_folder_filter();
        engine.clear_tag_filter();
        assert_eq!(engine.filters().folder_id, None);
        assert_eq!(engine.filters().tag, None);
        assert_eq!(engine.filters().search, "abc");

        engine.clear_all_filters();
        assert!(engine.filters().is_empty());
    }

    #[test]
    fn test_show_untagged_keeps_other_filters() {
        let mut engine = engine();
        let tagged = engine.create_note();
        engine.update_note(NotePatch::new(&tagged).title("report"));
        engine.set_tags(&tagged, ["x"]);
        let match_id = engine.create_note();
        engine.update_note(NotePatch::new(&match_id).title("report draft"));
        engine.create_note();

        engine.set_search("report");
        engine.show_untagged();

        assert_eq!(ids(&engine.filtered_notes()), vec![match_id]);
    }

    #[test]
    fn test_scenario_create_pin_search() {
        let mut engine = engine();
        let a = engine.create_note();
        engine.update_note(NotePatch::new(&a).title("Alpha"));
        let b = engine.create_note();
        engine.update_note(NotePatch::new(&b).title("Bravo"));
        engine.set_active_note(&b);

        assert_eq!(ids(&engine.filtered_notes()), vec![b.clone(), a.clone()]);

        engine.toggle_pinned(&a);
        assert_eq!(ids(&engine.filtered_notes()), vec![a.clone(), b.clone()]);

        engine.set_search("rav");
        assert_eq!(ids(&engine.filtered_notes()), vec![b]);
    }

    #[test]
    fn test_views_follow_mutations() {
        let mut engine = engine();
        let id = engine.create_note();
        assert_eq!(engine.counts().untagged, 1);
        assert!(engine.unique_tags().is_empty());

        engine.set_tags(&id, ["b", "a"]);
        assert_eq!(engine.counts().untagged, 0);
        assert_eq!(engine.unique_tags(), vec!["a", "b"]);

        engine.delete_note(&id);
        assert_eq!(engine.counts(), Counts::default());
        assert!(engine.unique_tags().is_empty());
    }

    #[test]
    fn test_init_loads_and_activates_first() {
        let storage = Storage::in_memory("test");
        let (first, folder) = {
            let mut engine = engine_with(storage.clone());
            engine.create_note();
            let first = engine.create_note();
            let folder = engine.add_folder("Saved");
            (first, folder)
        };

        let mut reloaded = NotesEngine::new(storage);
        reloaded.init();

        assert_eq!(reloaded.notes().len(), 2);
        assert_eq!(reloaded.active_note_id(), Some(first.as_str()));
        assert_eq!(reloaded.folder(&folder).unwrap().name, "Saved");
    }

    #[test]
    fn test_init_keeps_existing_active_note() {
        let storage = Storage::in_memory("test");
        {
            let mut engine = engine_with(storage.clone());
            engine.create_note();
        }

        let mut reloaded = NotesEngine::new(storage);
        reloaded.set_active_note("chosen");
        reloaded.init();
        assert_eq!(reloaded.active_note_id(), Some("chosen"));
    }

    #[test]
    fn test_init_cleans_stored_tags_and_keeps_collection() {
        let storage = Storage::in_memory("test");
        storage.set(
            NOTES_KEY,
            &serde_json::json!([
                {
                    "id": "dirty",
                    "title": "Dirty tags",
                    "content": "",
                    "createdAt": "2024-05-01T10:00:00Z",
                    "tags": ["x", "x", " x ", ""],
                    "folderId": null,
                    "pinned": false
                },
                {
                    "id": "clean",
                    "title": "Clean tags",
                    "content": "",
                    "createdAt": "2024-05-01T09:00:00Z",
                    "tags": ["work"],
                    "folderId": null,
                    "pinned": true
                }
            ]),
        );

        let mut engine = engine_with(storage.clone());
        engine.init();

        assert_eq!(engine.notes().len(), 2);
        let tags: Vec<&str> = engine
            .note("dirty")
            .unwrap()
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect();
        assert_eq!(tags, vec!["x"]);

        engine.create_note();
        let stored = stored_notes(&storage);
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().any(|n| n.id == "clean" && n.pinned));
    }

    #[test]
    fn test_init_with_empty_or_corrupt_storage() {
        let storage = Storage::in_memory("test");
        let mut engine = NotesEngine::new(storage.clone());
        engine.init();
        assert!(engine.notes().is_empty());
        assert_eq!(engine.active_note_id(), None);

        storage.set(NOTES_KEY, "definitely not a list");
        let mut engine = NotesEngine::new(storage);
        engine.init();
        assert!(engine.notes().is_empty());
    }

    #[test]
    fn test_engine_without_storage_still_works() {
        let mut engine = engine_with(Storage::unavailable("test"));
        engine.init();
        let id = engine.create_note();
        engine.set_tags(&id, ["x"]);

        assert_eq!(engine.unique_tags(), vec!["x"]);
    }
}
