use crate::model::{FolderId, NoteId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListalicoError {
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("Folder not found: {0}")]
    FolderNotFound(FolderId),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid backup file: {0}")]
    InvalidImport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, ListalicoError>;
