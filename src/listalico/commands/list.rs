use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::{index_notes, index_trashed_folders, index_trashed_notes};
use crate::model::FolderId;
use crate::store::{NoteStore, StorageBackend};

/// Narrows the note list. Both criteria must match when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub folder: Option<FolderId>,
    pub search: Option<String>,
}

impl NoteFilter {
    pub fn in_folder(mut self, folder: Option<FolderId>) -> Self {
        self.folder = folder;
        self
    }

    pub fn matching(mut self, term: Option<String>) -> Self {
        self.search = term;
        self
    }
}

/// Active notes in canonical order, filtered.
///
/// Indexes are assigned before filtering so they stay stable while a search
/// is active. A blank search term matches everything.
pub fn run<B: StorageBackend>(store: &NoteStore<B>, filter: &NoteFilter) -> Result<CmdResult> {
    let data = store.data();
    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let listed: Vec<_> = index_notes(&data.notes, &data.folders)
        .into_iter()
        .filter(|dn| filter.folder.map_or(true, |f| dn.note.folder_id == Some(f)))
        .filter(|dn| term.as_deref().map_or(true, |t| dn.note.matches(t)))
        .collect();

    let mut result = CmdResult::default().with_listed_notes(listed);
    result.total_notes = data.notes.len();
    Ok(result)
}

/// Trashed folders and trashed notes, most recently trashed first.
pub fn trash<B: StorageBackend>(store: &NoteStore<B>) -> Result<CmdResult> {
    let data = store.data();
    Ok(CmdResult {
        trashed_folders: index_trashed_folders(&data.trashed_folders),
        trashed_notes: index_trashed_notes(&data.trashed_notes),
        total_notes: data.notes.len(),
        ..Default::default()
    })
}
