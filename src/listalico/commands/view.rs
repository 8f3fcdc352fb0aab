use crate::commands::CmdResult;
use crate::error::{ListalicoError, Result};
use crate::index::{index_notes, index_trashed_notes, DisplayIndex};
use crate::store::{NoteStore, StorageBackend};

/// Looks up notes by display index, active and trashed alike, keeping the
/// order the indexes were given in.
pub fn run<B: StorageBackend>(store: &NoteStore<B>, indexes: &[DisplayIndex]) -> Result<CmdResult> {
    let data = store.data();
    let active = index_notes(&data.notes, &data.folders);
    let trashed = index_trashed_notes(&data.trashed_notes);

    let mut result = CmdResult {
        total_notes: data.notes.len(),
        ..Default::default()
    };
    for index in indexes {
        match index {
            DisplayIndex::Active(_) => {
                let dn = slot(&active, *index)
                    .ok_or_else(|| ListalicoError::Api(format!("Note {} not found", index)))?;
                result.listed_notes.push(dn.clone());
            }
            DisplayIndex::Trashed(_) => {
                let dn = slot(&trashed, *index)
                    .ok_or_else(|| ListalicoError::Api(format!("Note {} not found", index)))?;
                result.trashed_notes.push(dn.clone());
            }
        }
    }
    Ok(result)
}

fn slot<T>(list: &[T], index: DisplayIndex) -> Option<&T> {
    index.position().checked_sub(1).and_then(|i| list.get(i))
}
