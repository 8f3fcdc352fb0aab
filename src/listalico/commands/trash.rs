use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::model::{FolderId, NoteId};
use crate::store::{Collection, NoteStore, StorageBackend};
use chrono::Utc;

/// Moves a note from the active set to the trash, remembering where it was
/// filed.
pub fn note<B: StorageBackend>(store: &mut NoteStore<B>, id: NoteId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .notes
        .iter()
        .position(|n| n.id == id)
        .ok_or(ListalicoError::NoteNotFound(id))?;

    let note = data.notes.remove(pos);
    let trashed = note.clone().trash(Utc::now());
    data.trashed_notes.push(trashed);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Note moved to trash: {}",
        note.title
    )));
    result.record_persist(store.persist(&[Collection::TrashedNotes, Collection::Notes]));
    Ok(result.with_affected_notes(vec![note]))
}

/// Moves a folder to the trash together with every active note filed in it.
/// All of them share one `deleted_at` stamp.
pub fn folder<B: StorageBackend>(store: &mut NoteStore<B>, id: FolderId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .folders
        .iter()
        .position(|f| f.id == id)
        .ok_or(ListalicoError::FolderNotFound(id))?;

    let now = Utc::now();
    let folder = data.folders.remove(pos);
    data.trashed_folders.push(folder.clone().trash(now));

    let (cascaded, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut data.notes)
        .into_iter()
        .partition(|n| n.folder_id == Some(id));
    data.notes = kept;
    data.trashed_notes
        .extend(cascaded.iter().cloned().map(|n| n.trash(now)));

    let mut result = CmdResult::default();
    let message = if cascaded.is_empty() {
        format!("Folder moved to trash: {}", folder.name)
    } else {
        format!(
            "Folder moved to trash: {} (with {} note(s))",
            folder.name,
            cascaded.len()
        )
    };
    result.add_message(CmdMessage::success(message));
    result.record_persist(store.persist(&[
        Collection::TrashedFolders,
        Collection::Folders,
        Collection::TrashedNotes,
        Collection::Notes,
    ]));
    Ok(result
        .with_affected_folders(vec![folder])
        .with_affected_notes(cascaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::StoreFixture;

    #[test]
    fn trashing_a_note_preserves_its_folder() {
        let mut fx = StoreFixture::new().with_folder("Work").with_note("n", Some("Work"));
        let id = fx.note_id("n");
        let work = fx.folder_id("Work");

        note(&mut fx.store, id).unwrap();

        let data = fx.store.data();
        assert!(data.notes.is_empty());
        assert_eq!(data.trashed_notes.len(), 1);
        assert_eq!(data.trashed_notes[0].note.id, id);
        assert_eq!(data.trashed_notes[0].original_folder_id, Some(work));
    }

    #[test]
    fn trashing_unknown_note_fails_cleanly() {
        let mut fx = StoreFixture::new().with_note("n", None);
        assert!(note(&mut fx.store, NoteId(1)).is_err());
        assert_eq!(fx.store.data().notes.len(), 1);
        assert!(fx.store.data().trashed_notes.is_empty());
    }

    #[test]
    fn trashing_a_folder_cascades_to_its_notes() {
        let mut fx = StoreFixture::new()
            .with_folder("F1")
            .with_note("N1", Some("F1"));
        let f1 = fx.folder_id("F1");
        let n1 = fx.note_id("N1");

        let result = folder(&mut fx.store, f1).unwrap();
        assert_eq!(result.affected_notes.len(), 1);

        let data = fx.store.data();
        assert!(data.folders.is_empty());
        assert_eq!(data.trashed_folders.len(), 1);
        assert_eq!(data.trashed_folders[0].folder.id, f1);
        assert!(data.notes.is_empty());
        assert_eq!(data.trashed_notes.len(), 1);
        assert_eq!(data.trashed_notes[0].note.id, n1);
        assert_eq!(data.trashed_notes[0].original_folder_id, Some(f1));
        assert_eq!(
            data.trashed_notes[0].deleted_at,
            data.trashed_folders[0].deleted_at
        );
    }

    #[test]
    fn folder_cascade_leaves_other_notes_alone() {
        let mut fx = StoreFixture::new()
            .with_folder("A")
            .with_folder("B")
            .with_note("in a", Some("A"))
            .with_note("in b", Some("B"))
            .with_note("loose", None);
        let a = fx.folder_id("A");

        folder(&mut fx.store, a).unwrap();

        let data = fx.store.data();
        assert_eq!(data.notes.len(), 2);
        assert!(data.notes.iter().all(|n| n.folder_id != Some(a)));
        assert_eq!(data.folders.len(), 1);
    }

    #[test]
    fn trash_is_persisted() {
        let mut fx = StoreFixture::new().with_note("n", None);
        let id = fx.note_id("n");
        note(&mut fx.store, id).unwrap();

        let raw = fx
            .store
            .backend()
            .raw(crate::store::DELETED_NOTES_KEY)
            .unwrap();
        assert!(raw.contains("deletedAt"));
        assert_eq!(fx.store.backend().raw(crate::store::NOTES_KEY).unwrap(), "[]");
    }
}
