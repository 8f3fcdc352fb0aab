use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::model::{FolderId, NoteId};
use crate::store::{Collection, NoteStore, StorageBackend};

/// Permanently removes a trashed note.
pub fn note<B: StorageBackend>(store: &mut NoteStore<B>, id: NoteId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .trashed_notes
        .iter()
        .position(|n| n.note.id == id)
        .ok_or(ListalicoError::NoteNotFound(id))?;
    let removed = data.trashed_notes.remove(pos);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Purged note: {}",
        removed.note.title
    )));
    result.record_persist(store.persist(&[Collection::TrashedNotes]));
    Ok(result)
}

/// Permanently removes a trashed folder. Trashed notes that came from it
/// stay in the trash.
pub fn folder<B: StorageBackend>(store: &mut NoteStore<B>, id: FolderId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .trashed_folders
        .iter()
        .position(|f| f.folder.id == id)
        .ok_or(ListalicoError::FolderNotFound(id))?;
    let removed = data.trashed_folders.remove(pos);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Purged folder: {}",
        removed.folder.name
    )));
    result.record_persist(store.persist(&[Collection::TrashedFolders]));
    Ok(result)
}

/// Empties the trash.
pub fn all<B: StorageBackend>(store: &mut NoteStore<B>) -> Result<CmdResult> {
    let data = store.data_mut();
    let notes = std::mem::take(&mut data.trashed_notes);
    let folders = std::mem::take(&mut data.trashed_folders);

    let mut result = CmdResult::default();
    if notes.is_empty() && folders.is_empty() {
        result.add_message(CmdMessage::info("Trash is already empty."));
        return Ok(result);
    }

    result.add_message(CmdMessage::success(format!(
        "Purged {} folder(s) and {} note(s)",
        folders.len(),
        notes.len()
    )));
    result.record_persist(store.persist(&[Collection::TrashedFolders, Collection::TrashedNotes]));
    Ok(result)
}
