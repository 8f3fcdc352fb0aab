//! Full-state JSON backups.
//!
//! The backup document carries all four collections plus a small stamp:
//!
//! ```json
//! {
//!   "folders": [...],
//!   "notes": [...],
//!   "deletedFolders": [...],
//!   "deletedNotes": [...],
//!   "exportDate": "2024-05-01T10:00:00Z",
//!   "version": "1.0.0",
//!   "appName": "Listalico"
//! }
//! ```
//!
//! The same shape is read back by [`import`](super::import).

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Folder, Note, TrashedFolder, TrashedNote};
use crate::store::{Collections, NoteStore, StorageBackend};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKUP_VERSION: &str = "1.0.0";
pub const APP_NAME: &str = "Listalico";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub folders: Vec<Folder>,
    pub notes: Vec<Note>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deleted_folders: Vec<TrashedFolder>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deleted_notes: Vec<TrashedNote>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub app_name: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The stamp is informational. A date that is not RFC 3339 (or epoch
/// milliseconds) is dropped rather than failing the import.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl ExportDocument {
    /// Snapshot of the given collections, stamped with the current time.
    pub fn snapshot(data: &Collections) -> Self {
        Self {
            folders: data.folders.clone(),
            notes: data.notes.clone(),
            deleted_folders: data.trashed_folders.clone(),
            deleted_notes: data.trashed_notes.clone(),
            export_date: Some(Utc::now()),
            version: Some(BACKUP_VERSION.to_string()),
            app_name: Some(APP_NAME.to_string()),
        }
    }

    pub fn into_collections(self) -> Collections {
        Collections {
            folders: self.folders,
            notes: self.notes,
            trashed_folders: self.deleted_folders,
            trashed_notes: self.deleted_notes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `listalico-backup-YYYY-MM-DD.json`
pub fn backup_filename(date: NaiveDate) -> String {
    format!("listalico-backup-{}.json", date.format("%Y-%m-%d"))
}

pub fn document<B: StorageBackend>(store: &NoteStore<B>) -> ExportDocument {
    ExportDocument::snapshot(store.data())
}

/// Writes a backup of the whole store into `dir`, creating it if needed.
/// A backup written earlier the same day is overwritten.
pub fn run<B: StorageBackend>(store: &NoteStore<B>, dir: &Path) -> Result<CmdResult> {
    let doc = document(store);
    fs::create_dir_all(dir)?;

    let path: PathBuf = dir.join(backup_filename(Utc::now().date_naive()));
    fs::write(&path, doc.to_json()?)?;

    tracing::info!(
        path = %path.display(),
        folders = doc.folders.len(),
        notes = doc.notes.len(),
        "backup exported"
    );

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} folder(s), {} note(s) and {} trashed item(s) to {}",
        doc.folders.len(),
        doc.notes.len(),
        doc.deleted_folders.len() + doc.deleted_notes.len(),
        path.display()
    )));
    Ok(result.with_paths(vec![path]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::trash;
    use crate::store::fixtures::StoreFixture;
    use tempfile::tempdir;

    #[test]
    fn filename_uses_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_filename(date), "listalico-backup-2024-03-09.json");
    }

    #[test]
    fn document_has_camel_case_fields_and_stamp() {
        let mut fx = StoreFixture::new()
            .with_folder("F")
            .with_note("n", Some("F"))
            .with_note("gone", None);
        let gone = fx.note_id("gone");
        trash::note(&mut fx.store, gone).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&document(&fx.store).to_json().unwrap()).unwrap();
        assert_eq!(json["folders"].as_array().unwrap().len(), 1);
        assert_eq!(json["notes"].as_array().unwrap().len(), 1);
        assert_eq!(json["deletedNotes"].as_array().unwrap().len(), 1);
        assert!(json["deletedFolders"].as_array().unwrap().is_empty());
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["appName"], "Listalico");
        assert!(json["exportDate"].is_string());
        assert!(json["notes"][0]["folderId"].is_number());
    }

    #[test]
    fn writes_backup_into_new_directory() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("backups");
        let fx = StoreFixture::new().with_note("n", None);

        let result = run(&fx.store, &dir).unwrap();
        let path = &result.paths[0];
        assert!(path.starts_with(&dir));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("listalico-backup-"));

        let written: ExportDocument =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.notes.len(), 1);
    }
}
