use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::index::DisplayFolder;
use crate::model::{normalize_color, FolderId};
use crate::store::{Collection, NoteStore, StorageBackend};

/// Active folders with their active-note counts.
pub fn list<B: StorageBackend>(store: &NoteStore<B>) -> Result<CmdResult> {
    let data = store.data();
    let listed = data
        .folders
        .iter()
        .enumerate()
        .map(|(i, folder)| DisplayFolder {
            folder: folder.clone(),
            position: i + 1,
            note_count: data
                .notes
                .iter()
                .filter(|n| n.folder_id == Some(folder.id))
                .count(),
        })
        .collect();

    let mut result = CmdResult {
        listed_folders: listed,
        ..Default::default()
    };
    result.total_notes = data.notes.len();
    Ok(result)
}

pub fn rename<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: FolderId,
    name: &str,
) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListalicoError::Validation(
            "Folder name cannot be empty".into(),
        ));
    }

    let folder = store
        .data_mut()
        .folder_mut(id)
        .ok_or(ListalicoError::FolderNotFound(id))?;
    let old_name = std::mem::replace(&mut folder.name, name.to_string());
    let folder = folder.clone();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Folder renamed: {} -> {}",
        old_name, folder.name
    )));
    result.record_persist(store.persist(&[Collection::Folders]));
    Ok(result.with_affected_folders(vec![folder]))
}

pub fn recolor<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: FolderId,
    color: &str,
) -> Result<CmdResult> {
    let color = normalize_color(color).ok_or_else(|| {
        ListalicoError::Validation(format!("Invalid color: {} (expected #RRGGBB)", color))
    })?;

    let folder = store
        .data_mut()
        .folder_mut(id)
        .ok_or(ListalicoError::FolderNotFound(id))?;
    folder.color = color;
    let folder = folder.clone();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Folder {} is now {}",
        folder.name, folder.color
    )));
    result.record_persist(store.persist(&[Collection::Folders]));
    Ok(result.with_affected_folders(vec![folder]))
}
