// --- Test Fixtures ---

use super::mem_backend::MemBackend;
use super::{Collection, NoteStore};
use crate::model::{Folder, FolderId, Note, NoteId, Priority, DEFAULT_FOLDER_COLOR};
use chrono::{Duration, Utc};

pub struct StoreFixture {
    pub store: NoteStore<MemBackend>,
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFixture {
    /// A store with no folders at all (not even the initial one).
    pub fn new() -> Self {
        let backend = MemBackend::new();
        backend.seed(super::FOLDERS_KEY, "[]");
        Self {
            store: NoteStore::open(backend),
        }
    }

    pub fn with_folder(mut self, name: &str) -> Self {
        let id = self.store.next_folder_id();
        self.store.data_mut().folders.push(Folder::new(
            id,
            name.to_string(),
            DEFAULT_FOLDER_COLOR.to_string(),
        ));
        self.store.persist(&[Collection::Folders]);
        self
    }

    pub fn with_note(self, title: &str, folder: Option<&str>) -> Self {
        self.with_note_ext(title, folder, |_| {})
    }

    /// Adds a note and lets the caller tweak it before it is stored.
    pub fn with_note_ext<F: FnOnce(&mut Note)>(
        mut self,
        title: &str,
        folder: Option<&str>,
        tweak: F,
    ) -> Self {
        let folder_id = folder.map(|name| self.folder_id(name));
        let id = self.store.next_note_id();
        let mut note = Note::new(id, folder_id);
        note.title = title.to_string();
        tweak(&mut note);
        self.store.data_mut().notes.insert(0, note);
        self.store.persist(&[Collection::Notes]);
        self
    }

    /// Adds a task note updated `age_minutes` ago.
    pub fn with_task(self, title: &str, priority: Priority, completed: bool, age_minutes: i64) -> Self {
        self.with_note_ext(title, None, |n| {
            n.is_task = true;
            n.completed = completed;
            n.priority = Some(priority);
            n.updated_at = Utc::now() - Duration::minutes(age_minutes);
        })
    }

    pub fn folder_id(&self, name: &str) -> FolderId {
        self.store
            .data()
            .folders
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
            .unwrap_or_else(|| panic!("fixture folder {} missing", name))
    }

    pub fn note_id(&self, title: &str) -> NoteId {
        self.store
            .data()
            .notes
            .iter()
            .find(|n| n.title == title)
            .map(|n| n.id)
            .unwrap_or_else(|| panic!("fixture note {} missing", title))
    }
}
