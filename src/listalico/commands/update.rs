use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::model::{normalize_categories, FolderId, Note, NoteId, Priority};
use crate::store::{Collection, NoteStore, StorageBackend};

use super::helpers::require_folder;

/// A partial edit of a note. `None` fields are left as they are.
///
/// `folder_id` is doubly optional: `Some(None)` unfiles the note.
/// `add_categories` and `remove_categories` apply after `categories`, in that
/// order, so one patch can carry a whole edit of a single note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Option<FolderId>>,
    pub priority: Option<Priority>,
    pub categories: Option<Vec<String>>,
    pub add_categories: Vec<String>,
    pub remove_categories: Vec<String>,
    pub is_task: Option<bool>,
    pub completed: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        *self == NotePatch::default()
    }
}

/// Merges `patch` into the note and refreshes `updated_at`.
///
/// Validation happens before anything is touched: a blank title or an unknown
/// target folder leaves the note exactly as it was.
pub fn run<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: NoteId,
    patch: NotePatch,
) -> Result<CmdResult> {
    if store.data().note(id).is_none() {
        return Err(ListalicoError::NoteNotFound(id));
    }
    let title = match &patch.title {
        Some(t) if t.trim().is_empty() => {
            return Err(ListalicoError::Validation("Title cannot be empty".into()))
        }
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    if let Some(Some(folder_id)) = patch.folder_id {
        require_folder(store, folder_id)?;
    }
    if patch.add_categories.iter().any(|c| c.trim().is_empty()) {
        return Err(ListalicoError::Validation(
            "Category cannot be empty".into(),
        ));
    }

    let note = edit_note(store, id, |note| {
        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content.trim().to_string();
        }
        if let Some(folder_id) = patch.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(priority) = patch.priority {
            note.priority = Some(priority);
        }
        if let Some(categories) = patch.categories {
            note.categories = normalize_categories(categories);
        }
        for category in &patch.add_categories {
            note.add_category(category);
        }
        for category in &patch.remove_categories {
            note.remove_category(category);
        }
        if let Some(is_task) = patch.is_task {
            note.is_task = is_task;
        }
        if let Some(completed) = patch.completed {
            note.completed = completed;
        }
        true
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Note updated: {}", note.title)));
    Ok(finish(store, result, note))
}

/// Flips the completion flag of a note.
pub fn toggle_task<B: StorageBackend>(store: &mut NoteStore<B>, id: NoteId) -> Result<CmdResult> {
    let note = edit_note(store, id, |note| {
        note.completed = !note.completed;
        true
    })?;

    let mut result = CmdResult::default();
    let state = if note.completed { "completed" } else { "reopened" };
    result.add_message(CmdMessage::success(format!("Task {}: {}", state, note.title)));
    Ok(finish(store, result, note))
}

pub fn add_category<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: NoteId,
    category: &str,
) -> Result<CmdResult> {
    if category.trim().is_empty() {
        return Err(ListalicoError::Validation(
            "Category cannot be empty".into(),
        ));
    }
    let note = edit_note(store, id, |note| note.add_category(category))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Category added to {}: {}",
        note.title,
        category.trim()
    )));
    Ok(finish(store, result, note))
}

pub fn remove_category<B: StorageBackend>(
    store: &mut NoteStore<B>,
    id: NoteId,
    category: &str,
) -> Result<CmdResult> {
    let note = edit_note(store, id, |note| note.remove_category(category))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Category removed from {}: {}",
        note.title,
        category.trim()
    )));
    Ok(finish(store, result, note))
}

/// Applies `edit` to the note; when it reports a change, refreshes
/// `updated_at`. Returns a copy of the note after the edit.
fn edit_note<B, F>(store: &mut NoteStore<B>, id: NoteId, edit: F) -> Result<Note>
where
    B: StorageBackend,
    F: FnOnce(&mut Note) -> bool,
{
    let note = store
        .data_mut()
        .note_mut(id)
        .ok_or(ListalicoError::NoteNotFound(id))?;
    if edit(note) {
        note.touch();
    }
    Ok(note.clone())
}

fn finish<B: StorageBackend>(store: &mut NoteStore<B>, mut result: CmdResult, note: Note) -> CmdResult {
    let report = store.persist(&[Collection::Notes]);
    result.record_persist(report);
    result.with_affected_notes(vec![note])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::StoreFixture;
    use chrono::{Duration, Utc};

    fn aged_fixture() -> (StoreFixture, NoteId) {
        let fx = StoreFixture::new()
            .with_folder("Work")
            .with_note_ext("Draft", None, |n| {
                n.updated_at = Utc::now() - Duration::minutes(10);
            });
        let id = fx.note_id("Draft");
        (fx, id)
    }

    #[test]
    fn merges_patch_and_refreshes_updated_at() {
        let (mut fx, id) = aged_fixture();
        let before = fx.store.data().note(id).unwrap().updated_at;
        let work = fx.folder_id("Work");

        let patch = NotePatch {
            title: Some("  Final ".into()),
            content: Some(" body \n".into()),
            folder_id: Some(Some(work)),
            priority: Some(Priority::High),
            categories: Some(vec!["a".into(), "a".into(), "b".into()]),
            is_task: Some(true),
            ..Default::default()
        };
        run(&mut fx.store, id, patch).unwrap();

        let note = fx.store.data().note(id).unwrap();
        assert_eq!(note.title, "Final");
        assert_eq!(note.content, "body");
        assert_eq!(note.folder_id, Some(work));
        assert_eq!(note.priority, Some(Priority::High));
        assert_eq!(note.categories, vec!["a", "b"]);
        assert!(note.is_task);
        assert!(note.updated_at > before);
    }

    #[test]
    fn blank_title_is_rejected_without_changes() {
        let (mut fx, id) = aged_fixture();
        let before = fx.store.data().note(id).unwrap().clone();

        let patch = NotePatch {
            title: Some("   ".into()),
            content: Some("should not land".into()),
            ..Default::default()
        };
        let err = run(&mut fx.store, id, patch).unwrap_err();

        assert!(matches!(err, ListalicoError::Validation(_)));
        assert_eq!(fx.store.data().note(id).unwrap(), &before);
    }

    #[test]
    fn unknown_folder_is_rejected() {
        let (mut fx, id) = aged_fixture();
        let patch = NotePatch {
            folder_id: Some(Some(FolderId(12345))),
            ..Default::default()
        };
        assert!(matches!(
            run(&mut fx.store, id, patch),
            Err(ListalicoError::FolderNotFound(_))
        ));
    }

    #[test]
    fn patch_can_unfile() {
        let mut fx = StoreFixture::new().with_folder("Work").with_note("n", Some("Work"));
        let id = fx.note_id("n");
        let patch = NotePatch {
            folder_id: Some(None),
            ..Default::default()
        };
        run(&mut fx.store, id, patch).unwrap();
        assert_eq!(fx.store.data().note(id).unwrap().folder_id, None);
    }

    #[test]
    fn unknown_note_is_an_error() {
        let mut fx = StoreFixture::new();
        assert!(matches!(
            run(&mut fx.store, NoteId(1), NotePatch::default()),
            Err(ListalicoError::NoteNotFound(NoteId(1)))
        ));
    }

    #[test]
    fn toggle_task_flips_and_touches() {
        let (mut fx, id) = aged_fixture();
        let before = fx.store.data().note(id).unwrap().updated_at;

        toggle_task(&mut fx.store, id).unwrap();
        let note = fx.store.data().note(id).unwrap();
        assert!(note.completed);
        assert!(note.updated_at > before);

        toggle_task(&mut fx.store, id).unwrap();
        assert!(!fx.store.data().note(id).unwrap().completed);
    }

    #[test]
    fn categories_add_and_remove() {
        let (mut fx, id) = aged_fixture();
        add_category(&mut fx.store, id, "Home").unwrap();
        add_category(&mut fx.store, id, "Home").unwrap();
        add_category(&mut fx.store, id, "home").unwrap();
        assert_eq!(
            fx.store.data().note(id).unwrap().categories,
            vec!["Home", "home"]
        );

        remove_category(&mut fx.store, id, "Home").unwrap();
        assert_eq!(fx.store.data().note(id).unwrap().categories, vec!["home"]);

        assert!(add_category(&mut fx.store, id, "  ").is_err());
    }

    #[test]
    fn noop_category_change_keeps_updated_at() {
        let (mut fx, id) = aged_fixture();
        let before = fx.store.data().note(id).unwrap().updated_at;
        remove_category(&mut fx.store, id, "absent").unwrap();
        assert_eq!(fx.store.data().note(id).unwrap().updated_at, before);
    }

    #[test]
    fn patch_adds_and_removes_categories_in_one_touch() {
        let mut fx = StoreFixture::new().with_note_ext("Draft", None, |n| {
            n.categories = vec!["old".into(), "keep".into()];
        });
        let id = fx.note_id("Draft");

        let patch = NotePatch {
            priority: Some(Priority::Low),
            add_categories: vec!["a".into(), " b ".into(), "a".into()],
            remove_categories: vec!["old".into()],
            ..Default::default()
        };
        let result = run(&mut fx.store, id, patch).unwrap();

        assert_eq!(result.messages.len(), 1);
        let note = fx.store.data().note(id).unwrap();
        assert_eq!(note.categories, vec!["keep", "a", "b"]);
        assert_eq!(note.priority, Some(Priority::Low));
    }

    #[test]
    fn blank_added_category_is_rejected_without_changes() {
        let (mut fx, id) = aged_fixture();
        let before = fx.store.data().note(id).unwrap().clone();
        let patch = NotePatch {
            title: Some("New".into()),
            add_categories: vec!["  ".into()],
            ..Default::default()
        };
        assert!(matches!(
            run(&mut fx.store, id, patch),
            Err(ListalicoError::Validation(_))
        ));
        assert_eq!(fx.store.data().note(id).unwrap(), &before);
    }

    #[test]
    fn persisted_value_reflects_update() {
        let (mut fx, id) = aged_fixture();
        let patch = NotePatch {
            title: Some("Saved".into()),
            ..Default::default()
        };
        run(&mut fx.store, id, patch).unwrap();

        let raw = fx.store.backend().raw(crate::store::NOTES_KEY).unwrap();
        assert!(raw.contains("\"title\":\"Saved\""));
    }
}
