use crate::commands::export::ExportDocument;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ListalicoError, Result};
use crate::store::{NoteStore, StorageBackend};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Pre-import backups kept in the store. Older ones are removed after each
/// import.
pub const KEPT_BACKUPS: usize = 5;

const BACKUP_PREFIX: &str = "listalico-backup-";

/// What a backup document contains, shown before the user confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub folders: usize,
    pub notes: usize,
    pub deleted_folders: usize,
    pub deleted_notes: usize,
    pub export_date: Option<DateTime<Utc>>,
    pub app_name: Option<String>,
    pub version: Option<String>,
}

impl ImportSummary {
    pub fn of(doc: &ExportDocument) -> Self {
        Self {
            folders: doc.folders.len(),
            notes: doc.notes.len(),
            deleted_folders: doc.deleted_folders.len(),
            deleted_notes: doc.deleted_notes.len(),
            export_date: doc.export_date,
            app_name: doc.app_name.clone(),
            version: doc.version.clone(),
        }
    }
}

/// Parses and validates a backup document.
///
/// `folders` and `notes` must be present and be arrays. The trash
/// collections may be missing or `null`. The stamp fields are not checked.
pub fn parse_document(raw: &str) -> Result<ExportDocument> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ListalicoError::InvalidImport(format!("not valid JSON: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(ListalicoError::InvalidImport(
            "expected a JSON object at the top level".into(),
        ));
    };
    for field in ["folders", "notes"] {
        match object.get(field) {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ListalicoError::InvalidImport(format!(
                    "`{}` must be an array",
                    field
                )))
            }
            None => {
                return Err(ListalicoError::InvalidImport(format!(
                    "missing `{}`",
                    field
                )))
            }
        }
    }

    serde_json::from_value(value).map_err(|e| ListalicoError::InvalidImport(e.to_string()))
}

/// Replaces all four collections with the contents of `doc`.
///
/// When `backup` is set the current state is first stored under a
/// `listalico-backup-<timestamp>` key. If that write fails nothing is
/// imported.
pub fn run<B: StorageBackend>(
    store: &mut NoteStore<B>,
    doc: ExportDocument,
    backup: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if backup {
        let key = backup_key(Utc::now());
        let snapshot = ExportDocument::snapshot(store.data()).to_json()?;
        store.backend().write(&key, &snapshot).map_err(|e| {
            ListalicoError::Store(format!("could not write pre-import backup: {}", e))
        })?;
        tracing::info!(key = %key, "pre-import backup written");
        result.add_message(CmdMessage::info(format!(
            "Previous data backed up as {}",
            key
        )));
        if let Err(e) = prune_backups(store.backend(), KEPT_BACKUPS) {
            tracing::warn!(error = %e, "could not prune old pre-import backups");
        }
    }

    let summary = ImportSummary::of(&doc);
    let report = store.replace_all(doc.into_collections());
    tracing::info!(
        folders = summary.folders,
        notes = summary.notes,
        deleted_folders = summary.deleted_folders,
        deleted_notes = summary.deleted_notes,
        "backup imported"
    );

    result.add_message(CmdMessage::success(format!(
        "Imported {} folder(s), {} note(s) and {} trashed item(s)",
        summary.folders,
        summary.notes,
        summary.deleted_folders + summary.deleted_notes
    )));
    result.record_persist(report);
    Ok(result)
}

pub fn backup_key(at: DateTime<Utc>) -> String {
    format!("{}{}", BACKUP_PREFIX, at.format("%Y%m%d-%H%M%S%3f"))
}

/// Removes all but the `keep` newest backup keys. Keys carry a fixed-width
/// timestamp, so lexical order is chronological. Returns the removed keys.
pub fn prune_backups<B: StorageBackend>(backend: &B, keep: usize) -> Result<Vec<String>> {
    let mut keys: Vec<String> = backend
        .keys()?
        .into_iter()
        .filter(|k| k.starts_with(BACKUP_PREFIX))
        .collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));

    let stale = keys.split_off(keep.min(keys.len()));
    for key in &stale {
        backend.remove(key)?;
        tracing::debug!(key = %key, "old pre-import backup removed");
    }
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{export, trash};
    use crate::model::NoteId;
    use crate::store::fixtures::StoreFixture;
    use crate::store::mem_backend::MemBackend;
    use crate::store::{Collections, NOTES_KEY};
    use std::collections::BTreeSet;

    fn ids(data: &Collections) -> (BTreeSet<i64>, BTreeSet<i64>, BTreeSet<i64>, BTreeSet<i64>) {
        (
            data.folders.iter().map(|f| f.id.0).collect(),
            data.notes.iter().map(|n| n.id.0).collect(),
            data.trashed_folders.iter().map(|f| f.folder.id.0).collect(),
            data.trashed_notes.iter().map(|n| n.note.id.0).collect(),
        )
    }

    fn populated() -> StoreFixture {
        let mut fx = StoreFixture::new()
            .with_folder("Keep")
            .with_folder("Drop")
            .with_note("a", Some("Keep"))
            .with_note("b", Some("Drop"))
            .with_note("c", None);
        let drop = fx.folder_id("Drop");
        let c = fx.note_id("c");
        trash::note(&mut fx.store, c).unwrap();
        trash::folder(&mut fx.store, drop).unwrap();
        fx
    }

    #[test]
    fn export_then_import_is_idempotent() {
        let mut fx = populated();
        let before = fx.store.data().clone();

        let raw = export::document(&fx.store).to_json().unwrap();
        let doc = parse_document(&raw).unwrap();
        run(&mut fx.store, doc, false).unwrap();

        assert_eq!(ids(fx.store.data()), ids(&before));
        assert_eq!(fx.store.data(), &before);
    }

    #[test]
    fn import_replaces_another_store_wholesale() {
        let source = populated();
        let raw = export::document(&source.store).to_json().unwrap();

        let mut target = StoreFixture::new().with_note("old", None);
        run(&mut target.store, parse_document(&raw).unwrap(), false).unwrap();

        assert_eq!(ids(target.store.data()), ids(source.store.data()));
        // Ids issued after the import do not collide with imported ones.
        let max = target.store.data().max_id();
        assert!(target.store.next_note_id().0 > max);
    }

    #[test]
    fn rejects_missing_notes_without_changes() {
        let fx = StoreFixture::new().with_note("n", None);
        let before = fx.store.data().clone();

        let err = parse_document(r#"{"folders": []}"#).unwrap_err();
        assert!(matches!(err, ListalicoError::InvalidImport(_)));
        assert!(err.to_string().contains("notes"));
        assert_eq!(fx.store.data(), &before);
    }

    #[test]
    fn rejects_non_array_folders() {
        let err = parse_document(r#"{"folders": {}, "notes": []}"#).unwrap_err();
        assert!(err.to_string().contains("`folders` must be an array"));
    }

    #[test]
    fn rejects_malformed_json_and_non_objects() {
        assert!(matches!(
            parse_document("{oops"),
            Err(ListalicoError::InvalidImport(_))
        ));
        assert!(matches!(
            parse_document("[1, 2]"),
            Err(ListalicoError::InvalidImport(_))
        ));
    }

    #[test]
    fn trash_collections_are_optional() {
        let raw = r##"{
            "folders": [{"id": 1, "name": "Personal", "color": "#007AFF", "notes": []}],
            "notes": [{
                "id": 1700000000000,
                "title": "Hello",
                "content": "",
                "folderId": 1,
                "priority": "high",
                "categories": ["a"],
                "isTask": false,
                "completed": false,
                "createdAt": "2024-01-01T10:00:00.000Z",
                "updatedAt": "2024-01-01T10:00:00.000Z"
            }],
            "deletedNotes": null
        }"##;
        let doc = parse_document(raw).unwrap();
        assert!(doc.deleted_folders.is_empty());
        assert!(doc.deleted_notes.is_empty());
        assert_eq!(doc.notes[0].id, NoteId(1_700_000_000_000));

        let summary = ImportSummary::of(&doc);
        assert_eq!(summary.folders, 1);
        assert_eq!(summary.notes, 1);
        assert_eq!(summary.app_name, None);
    }

    #[test]
    fn writes_pre_import_backup() {
        let mut fx = StoreFixture::new().with_note("old", None);
        let doc = parse_document(r#"{"folders": [], "notes": []}"#).unwrap();

        let result = run(&mut fx.store, doc, true).unwrap();
        assert!(result.messages[0].content.contains("listalico-backup-"));

        let keys = fx.store.backend().keys().unwrap();
        let backup_key = keys
            .iter()
            .find(|k| k.starts_with("listalico-backup-"))
            .expect("backup key");
        let saved = parse_document(&fx.store.backend().raw(backup_key).unwrap()).unwrap();
        assert_eq!(saved.notes[0].title, "old");
        assert!(fx.store.data().notes.is_empty());
    }

    #[test]
    fn only_the_newest_backups_are_kept() {
        let mut fx = StoreFixture::new().with_note("old", None);
        for day in 1..=KEPT_BACKUPS + 2 {
            let key = format!("listalico-backup-202401{:02}-000000000", day);
            fx.store.backend().seed(&key, "{}");
        }

        let doc = parse_document(r#"{"folders": [], "notes": []}"#).unwrap();
        run(&mut fx.store, doc, true).unwrap();

        let mut backups: Vec<String> = fx
            .store
            .backend()
            .keys()
            .unwrap()
            .into_iter()
            .filter(|k| k.starts_with("listalico-backup-"))
            .collect();
        backups.sort();
        assert_eq!(backups.len(), KEPT_BACKUPS);
        // The one just written is newer than every seeded key.
        let newest = backups.last().unwrap();
        let saved = parse_document(&fx.store.backend().raw(newest).unwrap()).unwrap();
        assert_eq!(saved.notes[0].title, "old");
        assert!(!backups.contains(&"listalico-backup-20240101-000000000".to_string()));
        // Collections are never pruned.
        assert!(fx.store.backend().raw(NOTES_KEY).is_some());
    }

    #[test]
    fn pruning_leaves_other_keys_alone() {
        let backend = MemBackend::new();
        backend.seed("listalico-backup-20240101-000000000", "{}");
        backend.seed("listalico-backup-20240102-000000000", "{}");
        backend.seed("listalico-folders", "[]");

        let removed = prune_backups(&backend, 1).unwrap();
        assert_eq!(removed, vec!["listalico-backup-20240101-000000000"]);
        assert!(backend.raw("listalico-backup-20240102-000000000").is_some());
        assert!(backend.raw("listalico-folders").is_some());
        assert!(prune_backups(&backend, 5).unwrap().is_empty());
    }

    #[test]
    fn stamp_fields_in_other_shapes_still_import() {
        let raw = r#"{
            "folders": [],
            "notes": [],
            "exportDate": "01/05/2024",
            "version": 1,
            "appName": null
        }"#;
        let doc = parse_document(raw).unwrap();
        assert_eq!(doc.export_date, None);
        assert_eq!(doc.version.as_deref(), Some("1"));
        assert_eq!(doc.app_name, None);

        let doc = parse_document(
            r#"{"folders": [], "notes": [], "exportDate": "2024-05-01T10:00:00.000Z", "version": "1.0.0"}"#,
        )
        .unwrap();
        assert_eq!(
            doc.export_date.map(|d| d.to_rfc3339()),
            Some("2024-05-01T10:00:00+00:00".to_string())
        );
        assert_eq!(doc.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn failed_backup_aborts_the_import() {
        let backend = MemBackend::new();
        backend.seed(NOTES_KEY, "[]");
        let mut store = NoteStore::open(backend);
        let before = store.data().clone();
        store.backend().set_simulate_write_error(true);

        let doc = parse_document(r#"{"folders": [], "notes": []}"#).unwrap();
        assert!(matches!(
            run(&mut store, doc, true),
            Err(ListalicoError::Store(_))
        ));
        assert_eq!(store.data(), &before);
    }

    #[test]
    fn backup_key_has_millisecond_stamp() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:11:12.345Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(backup_key(at), "listalico-backup-20240501-101112345");
    }
}
