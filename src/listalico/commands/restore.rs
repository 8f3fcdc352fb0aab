use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::model::{FolderId, NoteId};
use crate::store::{Collection, NoteStore, StorageBackend};

/// Takes a note out of the trash and appends it to the active notes.
///
/// The note keeps its `folder_id`. If that folder is gone the note simply
/// shows up as unfiled.
pub fn note<B: StorageBackend>(store: &mut NoteStore<B>, id: NoteId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .trashed_notes
        .iter()
        .position(|n| n.note.id == id)
        .ok_or(ListalicoError::NoteNotFound(id))?;

    let note = data.trashed_notes.remove(pos).restore();
    data.notes.push(note.clone());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Note restored: {}", note.title)));
    result.record_persist(store.persist(&[Collection::Notes, Collection::TrashedNotes]));
    Ok(result.with_affected_notes(vec![note]))
}

/// Takes a folder out of the trash, along with the notes that were trashed
/// together with it. Notes trashed on their own earlier stay in the trash.
pub fn folder<B: StorageBackend>(store: &mut NoteStore<B>, id: FolderId) -> Result<CmdResult> {
    let data = store.data_mut();
    let pos = data
        .trashed_folders
        .iter()
        .position(|f| f.folder.id == id)
        .ok_or(ListalicoError::FolderNotFound(id))?;

    let trashed = data.trashed_folders.remove(pos);
    let deleted_at = trashed.deleted_at;
    let folder = trashed.restore();
    data.folders.push(folder.clone());

    let (cascaded, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut data.trashed_notes)
        .into_iter()
        .partition(|n| n.original_folder_id == Some(id) && n.deleted_at == deleted_at);
    data.trashed_notes = kept;
    let restored: Vec<_> = cascaded.into_iter().map(|n| n.restore()).collect();
    data.notes.extend(restored.iter().cloned());

    let mut result = CmdResult::default();
    let message = if restored.is_empty() {
        format!("Folder restored: {}", folder.name)
    } else {
        format!(
            "Folder restored: {} (with {} note(s))",
            folder.name,
            restored.len()
        )
    };
    result.add_message(CmdMessage::success(message));
    result.record_persist(store.persist(&[
        Collection::Folders,
        Collection::TrashedFolders,
        Collection::Notes,
        Collection::TrashedNotes,
    ]));
    Ok(result
        .with_affected_folders(vec![folder])
        .with_affected_notes(restored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::trash;
    use crate::store::fixtures::StoreFixture;

    #[test]
    fn trash_then_restore_round_trips_the_note() {
        let mut fx = StoreFixture::new()
            .with_folder("Work")
            .with_note_ext("n", Some("Work"), |n| {
                n.categories = vec!["x".into()];
                n.is_task = true;
            })
            .with_note("other", None);
        let id = fx.note_id("n");
        let original = fx.store.data().note(id).unwrap().clone();

        trash::note(&mut fx.store, id).unwrap();
        let result = note(&mut fx.store, id).unwrap();

        assert_eq!(result.affected_notes[0], original);
        assert_eq!(fx.store.data().note(id), Some(&original));
        assert!(fx.store.data().trashed_notes.is_empty());
        // Re-appended at the end.
        assert_eq!(fx.store.data().notes.last().unwrap().id, id);
    }

    #[test]
    fn restored_note_carries_no_trash_fields_on_the_wire() {
        let mut fx = StoreFixture::new().with_note("n", None);
        let id = fx.note_id("n");
        trash::note(&mut fx.store, id).unwrap();
        note(&mut fx.store, id).unwrap();

        let raw = fx.store.backend().raw(crate::store::NOTES_KEY).unwrap();
        assert!(!raw.contains("deletedAt"));
        assert!(!raw.contains("originalFolderId"));
    }

    #[test]
    fn restoring_missing_note_is_an_error() {
        let mut fx = StoreFixture::new();
        assert!(matches!(
            note(&mut fx.store, NoteId(5)),
            Err(ListalicoError::NoteNotFound(NoteId(5)))
        ));
    }

    #[test]
    fn restoring_a_folder_brings_back_its_cascaded_notes() {
        let mut fx = StoreFixture::new()
            .with_folder("F")
            .with_note("early", Some("F"))
            .with_note("late", Some("F"));
        let f = fx.folder_id("F");
        let early = fx.note_id("early");

        // Trashed on its own, before the folder went.
        trash::note(&mut fx.store, early).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        trash::folder(&mut fx.store, f).unwrap();

        let result = folder(&mut fx.store, f).unwrap();
        assert_eq!(result.affected_notes.len(), 1);
        assert_eq!(result.affected_notes[0].title, "late");

        let data = fx.store.data();
        assert_eq!(data.folders.len(), 1);
        assert!(data.trashed_folders.is_empty());
        assert_eq!(data.notes.len(), 1);
        assert_eq!(data.trashed_notes.len(), 1);
        assert_eq!(data.trashed_notes[0].note.id, early);
    }

    #[test]
    fn note_restored_after_its_folder_was_purged_dangles() {
        let mut fx = StoreFixture::new().with_folder("F").with_note("n", Some("F"));
        let f = fx.folder_id("F");
        let n = fx.note_id("n");

        trash::folder(&mut fx.store, f).unwrap();
        crate::commands::purge::folder(&mut fx.store, f).unwrap();
        note(&mut fx.store, n).unwrap();

        let restored = fx.store.data().note(n).unwrap();
        assert_eq!(restored.folder_id, Some(f));
        assert!(fx.store.data().folder(f).is_none());
    }
}
