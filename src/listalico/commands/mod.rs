use crate::config::ListalicoConfig;
use crate::index::{DisplayFolder, DisplayNote, DisplayTrashedFolder, DisplayTrashedNote};
use crate::model::{Folder, Note};
use crate::store::PersistReport;
use std::path::PathBuf;

pub mod config;
pub mod create;
pub mod export;
pub mod folders;
pub mod helpers;
pub mod import;
pub mod list;
pub mod move_note;
pub mod purge;
pub mod restore;
pub mod trash;
pub mod update;
pub mod view;

#[derive(Debug, Clone)]
pub struct ListalicoPaths {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub affected_folders: Vec<Folder>,
    pub listed_notes: Vec<DisplayNote>,
    pub listed_folders: Vec<DisplayFolder>,
    pub trashed_notes: Vec<DisplayTrashedNote>,
    pub trashed_folders: Vec<DisplayTrashedFolder>,
    /// Total number of active notes, regardless of any filter.
    pub total_notes: usize,
    pub paths: Vec<PathBuf>,
    pub config: Option<ListalicoConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn with_affected_folders(mut self, folders: Vec<Folder>) -> Self {
        self.affected_folders = folders;
        self
    }

    pub fn with_listed_notes(mut self, notes: Vec<DisplayNote>) -> Self {
        self.listed_notes = notes;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: ListalicoConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Turns write failures into warnings. The mutation itself stands.
    pub fn record_persist(&mut self, report: PersistReport) {
        for failure in report.failures {
            self.add_message(CmdMessage::warning(format!(
                "Changes kept in memory but not saved ({}): {}",
                failure.key, failure.reason
            )));
        }
    }

    /// Folds the outcome of another command into this one.
    pub fn absorb(&mut self, other: CmdResult) {
        self.affected_notes.extend(other.affected_notes);
        self.affected_folders.extend(other.affected_folders);
        self.listed_notes.extend(other.listed_notes);
        self.listed_folders.extend(other.listed_folders);
        self.trashed_notes.extend(other.trashed_notes);
        self.trashed_folders.extend(other.trashed_folders);
        self.total_notes = other.total_notes.max(self.total_notes);
        self.paths.extend(other.paths);
        if other.config.is_some() {
            self.config = other.config;
        }
        self.messages.extend(other.messages);
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning)
    }
}
