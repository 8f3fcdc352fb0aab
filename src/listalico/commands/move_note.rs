use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::index::folder_name;
use crate::model::{FolderId, NoteId};
use crate::store::{Collection, NoteStore, StorageBackend};

use super::helpers::require_folder;

/// Files a note into `target`, or unfiles it when `target` is `None`.
pub fn run<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: NoteId,
    target: Option<FolderId>,
) -> Result<CmdResult> {
    if let Some(folder_id) = target {
        require_folder(store, folder_id)?;
    }

    let note = store
        .data_mut()
        .note_mut(id)
        .ok_or(ListalicoError::NoteNotFound(id))?;
    note.folder_id = target;
    note.touch();
    let note = note.clone();

    let destination =
        folder_name(&store.data().folders, target).unwrap_or_else(|| "no folder".to_string());
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Moved {} to {}",
        note.title, destination
    )));
    result.record_persist(store.persist(&[Collection::Notes]));
    Ok(result.with_affected_notes(vec![note]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::StoreFixture;
    use chrono::{Duration, Utc};

    #[test]
    fn moves_note_and_refreshes_updated_at() {
        let mut fx = StoreFixture::new()
            .with_folder("A")
            .with_folder("B")
            .with_note_ext("n", Some("A"), |n| {
                n.updated_at = Utc::now() - Duration::minutes(5);
            });
        let id = fx.note_id("n");
        let b = fx.folder_id("B");
        let before = fx.store.data().note(id).unwrap().updated_at;

        let result = run(&mut fx.store, id, Some(b)).unwrap();
        assert!(result.messages[0].content.contains("to B"));

        let note = fx.store.data().note(id).unwrap();
        assert_eq!(note.folder_id, Some(b));
        assert!(note.updated_at > before);
    }

    #[test]
    fn unfiles_note() {
        let mut fx = StoreFixture::new().with_folder("A").with_note("n", Some("A"));
        let id = fx.note_id("n");
        run(&mut fx.store, id, None).unwrap();
        assert_eq!(fx.store.data().note(id).unwrap().folder_id, None);
    }

    #[test]
    fn refuses_missing_target() {
        let mut fx = StoreFixture::new().with_folder("A").with_note("n", Some("A"));
        let id = fx.note_id("n");
        let a = fx.folder_id("A");
        assert!(run(&mut fx.store, id, Some(FolderId(77))).is_err());
        assert_eq!(fx.store.data().note(id).unwrap().folder_id, Some(a));
    }
}
