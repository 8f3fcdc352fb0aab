//! # Storage Layer
//!
//! [`NoteStore`] holds the four collections of the application (active folders,
//! active notes, trashed folders, trashed notes) in memory and mirrors each one
//! to a [`StorageBackend`] under its own key.
//!
//! ## Persistence Model
//!
//! The store behaves like the browser app's local-storage hook:
//!
//! - **Load**: each collection is read once, when the store is opened. A missing
//!   key yields the collection's default. A value that cannot be read or parsed
//!   is logged and also yields the default.
//! - **Write**: after a mutation, every touched collection is serialized in full
//!   and written back. A failed write is logged and reported in a
//!   [`PersistReport`]; the in-memory state keeps the mutation.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one JSON file per key in a data directory.
//! - [`mem_backend::MemBackend`]: in-memory map for tests.
//!
//! ## Storage Format
//!
//! ```text
//! <data_dir>/
//! ├── listalico-folders.json          # Folder[]
//! ├── listalico-notes.json            # Note[]
//! ├── listalico-deleted-folders.json  # TrashedFolder[]
//! ├── listalico-deleted-notes.json    # TrashedNote[]
//! ├── listalico-backup-<stamp>.json   # pre-import snapshots
//! └── config.json                     # settings
//! ```

use crate::ids::IdGenerator;
use crate::model::{Folder, FolderId, Note, NoteId, TrashedFolder, TrashedNote};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures;

pub use backend::StorageBackend;

pub const FOLDERS_KEY: &str = "listalico-folders";
pub const NOTES_KEY: &str = "listalico-notes";
pub const DELETED_FOLDERS_KEY: &str = "listalico-deleted-folders";
pub const DELETED_NOTES_KEY: &str = "listalico-deleted-notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Folders,
    Notes,
    TrashedFolders,
    TrashedNotes,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Folders,
        Collection::Notes,
        Collection::TrashedFolders,
        Collection::TrashedNotes,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Folders => FOLDERS_KEY,
            Collection::Notes => NOTES_KEY,
            Collection::TrashedFolders => DELETED_FOLDERS_KEY,
            Collection::TrashedNotes => DELETED_NOTES_KEY,
        }
    }
}

/// The four collections, as held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub folders: Vec<Folder>,
    pub notes: Vec<Note>,
    pub trashed_folders: Vec<TrashedFolder>,
    pub trashed_notes: Vec<TrashedNote>,
}

impl Collections {
    /// Largest id in use anywhere, notes and folders alike.
    pub fn max_id(&self) -> i64 {
        let folder_ids = self
            .folders
            .iter()
            .map(|f| f.id.0)
            .chain(self.trashed_folders.iter().map(|f| f.folder.id.0));
        let note_ids = self
            .notes
            .iter()
            .map(|n| n.id.0)
            .chain(self.trashed_notes.iter().map(|n| n.note.id.0));
        folder_ids.chain(note_ids).max().unwrap_or(0)
    }

    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn folder_mut(&mut self, id: FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    pub key: &'static str,
    pub reason: String,
}

/// Outcome of writing collections back to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub failures: Vec<PersistFailure>,
}

impl PersistReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct NoteStore<B: StorageBackend> {
    backend: B,
    data: Collections,
    ids: IdGenerator,
}

impl<B: StorageBackend> NoteStore<B> {
    /// Loads all collections from `backend`, falling back to defaults for
    /// anything missing or unreadable.
    pub fn open(backend: B) -> Self {
        let data = Collections {
            folders: load_or(&backend, FOLDERS_KEY, || vec![Folder::initial()]),
            notes: load_or(&backend, NOTES_KEY, Vec::new),
            trashed_folders: load_or(&backend, DELETED_FOLDERS_KEY, Vec::new),
            trashed_notes: load_or(&backend, DELETED_NOTES_KEY, Vec::new),
        };
        let ids = IdGenerator::seeded(data.max_id());
        tracing::debug!(
            folders = data.folders.len(),
            notes = data.notes.len(),
            trashed_folders = data.trashed_folders.len(),
            trashed_notes = data.trashed_notes.len(),
            "note store loaded"
        );
        Self { backend, data, ids }
    }

    pub fn data(&self) -> &Collections {
        &self.data
    }

    /// Mutable access to the collections. Callers must [`persist`](Self::persist)
    /// whatever they touch.
    pub fn data_mut(&mut self) -> &mut Collections {
        &mut self.data
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn next_note_id(&mut self) -> NoteId {
        self.ids.next_note_id()
    }

    pub fn next_folder_id(&mut self) -> FolderId {
        self.ids.next_folder_id()
    }

    /// Writes the given collections back in full.
    pub fn persist(&mut self, collections: &[Collection]) -> PersistReport {
        let mut report = PersistReport::default();
        for &collection in collections {
            let outcome = match collection {
                Collection::Folders => save(&self.backend, collection.key(), &self.data.folders),
                Collection::Notes => save(&self.backend, collection.key(), &self.data.notes),
                Collection::TrashedFolders => {
                    save(&self.backend, collection.key(), &self.data.trashed_folders)
                }
                Collection::TrashedNotes => {
                    save(&self.backend, collection.key(), &self.data.trashed_notes)
                }
            };
            if let Err(reason) = outcome {
                report.failures.push(PersistFailure {
                    key: collection.key(),
                    reason,
                });
            }
        }
        report
    }

    /// Swaps in a whole new data set and writes every collection.
    pub fn replace_all(&mut self, data: Collections) -> PersistReport {
        self.ids.observe(data.max_id());
        self.data = data;
        self.persist(&Collection::ALL)
    }
}

fn load_or<T, F>(backend: &impl StorageBackend, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match backend.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is corrupt, using default");
                default()
            }
        },
        Ok(None) => default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read stored value, using default");
            default()
        }
    }
}

fn save<T: Serialize>(backend: &impl StorageBackend, key: &str, value: &T) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    match backend.write(key, &raw) {
        Ok(()) => {
            tracing::debug!(key, bytes = raw.len(), "collection written");
            Ok(())
        }
        Err(e) => {
            tracing::error!(key, error = %e, "could not persist collection");
            Err(e.to_string())
        }
    }
}
