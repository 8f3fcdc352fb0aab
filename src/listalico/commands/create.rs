use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::model::{normalize_color, Folder, FolderId, Note, DEFAULT_FOLDER_NAME};
use crate::store::{Collection, NoteStore, StorageBackend};

use super::helpers::require_folder;

/// Creates a note filed in `target` (or unfiled) and puts it at the front of
/// the active notes.
pub fn note<B: StorageBackend>(
    store: &mut NoteStore<B>,
    target: Option<FolderId>,
    title: Option<String>,
) -> Result<CmdResult> {
    if let Some(folder_id) = target {
        require_folder(store, folder_id)?;
    }
    let title = match title {
        Some(t) if t.trim().is_empty() => {
            return Err(ListalicoError::Validation("Title cannot be empty".into()))
        }
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };

    let id = store.next_note_id();
    let mut note = Note::new(id, target);
    if let Some(title) = title {
        note.title = title;
    }

    store.data_mut().notes.insert(0, note.clone());
    let report = store.persist(&[Collection::Notes]);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Note created: {}", note.title)));
    result.record_persist(report);
    Ok(result.with_affected_notes(vec![note]))
}

/// Appends a new folder. A blank or missing name falls back to the default.
pub fn folder<B: StorageBackend>(
    store: &mut NoteStore<B>,
    name: Option<String>,
    color: &str,
) -> Result<CmdResult> {
    let color = normalize_color(color)
        .ok_or_else(|| ListalicoError::Validation(format!("Invalid color: {}", color)))?;
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());

    let id = store.next_folder_id();
    let folder = Folder::new(id, name, color);
    store.data_mut().folders.push(folder.clone());
    let report = store.persist(&[Collection::Folders]);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Folder created: {}",
        folder.name
    )));
    result.record_persist(report);
    Ok(result.with_affected_folders(vec![folder]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, DEFAULT_FOLDER_COLOR, DEFAULT_NOTE_TITLE};
    use crate::store::fixtures::StoreFixture;

    #[test]
    fn creates_note_with_defaults_at_front() {
        let mut fx = StoreFixture::new().with_folder("Work").with_note("older", None);
        let work = fx.folder_id("Work");

        let result = note(&mut fx.store, Some(work), None).unwrap();
        let created = &result.affected_notes[0];

        assert_eq!(created.title, DEFAULT_NOTE_TITLE);
        assert_eq!(created.folder_id, Some(work));
        assert_eq!(created.priority, Some(Priority::Medium));
        assert_eq!(fx.store.data().notes[0].id, created.id);
        assert_eq!(fx.store.data().notes.len(), 2);
    }

    #[test]
    fn creates_unfiled_note_with_title() {
        let mut fx = StoreFixture::new();
        let result = note(&mut fx.store, None, Some("  Groceries ".into())).unwrap();
        assert_eq!(result.affected_notes[0].title, "Groceries");
        assert_eq!(result.affected_notes[0].folder_id, None);
    }

    #[test]
    fn rejects_blank_title_and_unknown_folder() {
        let mut fx = StoreFixture::new();
        assert!(matches!(
            note(&mut fx.store, None, Some("   ".into())),
            Err(ListalicoError::Validation(_))
        ));
        assert!(matches!(
            note(&mut fx.store, Some(FolderId(404)), None),
            Err(ListalicoError::FolderNotFound(FolderId(404)))
        ));
        assert!(fx.store.data().notes.is_empty());
    }

    #[test]
    fn notes_created_back_to_back_get_distinct_ids() {
        let mut fx = StoreFixture::new();
        let a = note(&mut fx.store, None, None).unwrap().affected_notes[0].id;
        let b = note(&mut fx.store, None, None).unwrap().affected_notes[0].id;
        assert_ne!(a, b);
    }

    #[test]
    fn creates_folder_with_default_name_and_color() {
        let mut fx = StoreFixture::new().with_folder("First");
        let result = folder(&mut fx.store, None, DEFAULT_FOLDER_COLOR).unwrap();

        let created = &result.affected_folders[0];
        assert_eq!(created.name, DEFAULT_FOLDER_NAME);
        assert_eq!(created.color, DEFAULT_FOLDER_COLOR);
        // Appended, not prepended.
        assert_eq!(fx.store.data().folders.last().unwrap().id, created.id);
    }

    #[test]
    fn rejects_invalid_folder_color() {
        let mut fx = StoreFixture::new();
        assert!(folder(&mut fx.store, Some("X".into()), "red").is_err());
        assert!(fx.store.data().folders.is_empty());
    }

    #[test]
    fn persistence_failure_becomes_warning() {
        let mut fx = StoreFixture::new();
        fx.store.backend().set_simulate_write_error(true);

        let result = note(&mut fx.store, None, None).unwrap();
        assert!(result.has_warnings());
        assert_eq!(fx.store.data().notes.len(), 1);
    }
}
