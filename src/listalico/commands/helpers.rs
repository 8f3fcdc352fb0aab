use crate::error::{ListalicoError, Result};
use crate::index::{
    index_trashed_folders, ranked_notes, ranked_trashed_notes, DisplayIndex, FolderSelector,
    IndexSelector,
};
use crate::model::{FolderId, NoteId};
use crate::store::{NoteStore, StorageBackend};
use std::collections::HashSet;

/// Expands typed selectors against the current lists. Ranges are clipped to
/// the list they address; repeats are dropped, first occurrence wins.
pub fn expand_selectors<B: StorageBackend>(
    store: &NoteStore<B>,
    selectors: &[IndexSelector],
) -> Result<Vec<DisplayIndex>> {
    let data = store.data();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for selector in selectors {
        let len = if selector.is_trashed() {
            data.trashed_notes.len()
        } else {
            data.notes.len()
        };
        for idx in selector.expand(len).map_err(ListalicoError::Api)? {
            if seen.insert(idx) {
                out.push(idx);
            }
        }
    }
    Ok(out)
}

/// Maps display indexes to note ids. `Active` indexes resolve against active
/// notes, `Trashed` indexes against the trash. Each list is ranked once.
pub fn resolve_notes<B: StorageBackend>(
    store: &NoteStore<B>,
    indexes: &[DisplayIndex],
) -> Result<Vec<NoteId>> {
    let data = store.data();
    let active = ranked_notes(&data.notes);
    let trashed = ranked_trashed_notes(&data.trashed_notes);

    indexes
        .iter()
        .map(|&index| {
            let slot = index.position().checked_sub(1);
            let found = match index {
                DisplayIndex::Active(_) => slot.and_then(|i| active.get(i)).map(|n| n.id),
                DisplayIndex::Trashed(_) => slot.and_then(|i| trashed.get(i)).map(|t| t.note.id),
            };
            found.ok_or_else(|| ListalicoError::Api(format!("Note {} not found", index)))
        })
        .collect()
}

/// Maps a selector to an active folder id. Names match case-insensitively;
/// the first match wins.
pub fn resolve_folder<B: StorageBackend>(
    store: &NoteStore<B>,
    selector: &FolderSelector,
) -> Result<FolderId> {
    let folders = &store.data().folders;
    let found = match selector {
        FolderSelector::Position(n) => n
            .checked_sub(1)
            .and_then(|i| folders.get(i))
            .map(|f| f.id),
        FolderSelector::Name(name) => {
            let lower = name.to_lowercase();
            folders
                .iter()
                .find(|f| f.name.to_lowercase() == lower)
                .map(|f| f.id)
        }
        FolderSelector::Trashed(_) => {
            return Err(ListalicoError::Api(format!(
                "Folder {} is in the trash; restore it first",
                selector
            )))
        }
    };
    found.ok_or_else(|| ListalicoError::Api(format!("Folder {} not found", selector)))
}

pub fn resolve_trashed_folder<B: StorageBackend>(
    store: &NoteStore<B>,
    selector: &FolderSelector,
) -> Result<FolderId> {
    let trashed = index_trashed_folders(&store.data().trashed_folders);
    let found = match selector {
        FolderSelector::Trashed(n) => trashed
            .into_iter()
            .find(|df| df.index == DisplayIndex::Trashed(*n))
            .map(|df| df.folder.folder.id),
        FolderSelector::Name(name) => {
            let lower = name.to_lowercase();
            trashed
                .into_iter()
                .find(|df| df.folder.folder.name.to_lowercase() == lower)
                .map(|df| df.folder.folder.id)
        }
        FolderSelector::Position(_) => None,
    };
    found.ok_or_else(|| ListalicoError::Api(format!("Trashed folder {} not found", selector)))
}

/// Fails unless `id` names an active folder.
pub fn require_folder<B: StorageBackend>(store: &NoteStore<B>, id: FolderId) -> Result<()> {
    if store.data().folder(id).is_some() {
        Ok(())
    } else {
        Err(ListalicoError::FolderNotFound(id))
    }
}
