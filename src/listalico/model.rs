//! Core data types: [`Folder`], [`Note`] and their trashed counterparts.
//!
//! Field names serialize in camelCase so documents stay compatible with
//! Listalico backups produced by the browser app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_NOTE_TITLE: &str = "Nueva Nota";
pub const DEFAULT_FOLDER_NAME: &str = "Nueva Carpeta";
pub const DEFAULT_FOLDER_COLOR: &str = "#666666";
pub const INITIAL_FOLDER_NAME: &str = "Personal";

pub const PRESET_COLORS: [&str; 8] = [
    "#007aff", "#34c759", "#ff9500", "#ff453a", "#af52de", "#5ac8fa", "#ffcc02", "#ff2d92",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight, higher first. A note without priority ranks 0.
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(format!(
                "Invalid priority: {} (expected high, medium or low)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub color: String,
    // Legacy field from early versions of the app. Never read, kept for round-trips.
    #[serde(default)]
    pub notes: Vec<serde_json::Value>,
}

impl Folder {
    pub fn new(id: FolderId, name: String, color: String) -> Self {
        Self {
            id,
            name,
            color,
            notes: Vec::new(),
        }
    }

    /// The folder every fresh store starts with.
    pub fn initial() -> Self {
        Self::new(
            FolderId(1),
            INITIAL_FOLDER_NAME.to_string(),
            DEFAULT_FOLDER_COLOR.to_string(),
        )
    }

    pub fn trash(self, deleted_at: DateTime<Utc>) -> TrashedFolder {
        TrashedFolder {
            folder: self,
            deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_task: bool,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: NoteId, folder_id: Option<FolderId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            folder_id,
            priority: Some(Priority::Medium),
            categories: Vec::new(),
            is_task: false,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. Never moves it backwards, even if the clock does.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = now.max(self.updated_at);
    }

    /// Case-insensitive substring match against title, content and categories.
    /// `term_lower` must already be lowercased.
    pub fn matches(&self, term_lower: &str) -> bool {
        self.title.to_lowercase().contains(term_lower)
            || self.content.to_lowercase().contains(term_lower)
            || self
                .categories
                .iter()
                .any(|c| c.to_lowercase().contains(term_lower))
    }

    /// Adds a category unless an identical one is already present.
    /// Returns whether the note changed.
    pub fn add_category(&mut self, category: &str) -> bool {
        let category = category.trim();
        if category.is_empty() || self.categories.iter().any(|c| c == category) {
            return false;
        }
        self.categories.push(category.to_string());
        true
    }

    pub fn remove_category(&mut self, category: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != category.trim());
        self.categories.len() != before
    }

    pub fn trash(self, deleted_at: DateTime<Utc>) -> TrashedNote {
        let original_folder_id = self.folder_id;
        TrashedNote {
            note: self,
            deleted_at,
            original_folder_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedFolder {
    #[serde(flatten)]
    pub folder: Folder,
    pub deleted_at: DateTime<Utc>,
}

impl TrashedFolder {
    pub fn restore(self) -> Folder {
        self.folder
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedNote {
    #[serde(flatten)]
    pub note: Note,
    pub deleted_at: DateTime<Utc>,
    #[serde(default)]
    pub original_folder_id: Option<FolderId>,
}

impl TrashedNote {
    pub fn restore(self) -> Note {
        self.note
    }
}

/// Validates a `#RRGGBB` color and returns it lowercased.
pub fn normalize_color(input: &str) -> Option<String> {
    let input = input.trim();
    let hex = input.strip_prefix('#')?;
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(input.to_ascii_lowercase())
    } else {
        None
    }
}

/// De-duplicates categories keeping first occurrence, dropping blanks.
pub fn normalize_categories(categories: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.trim();
        if !category.is_empty() && !out.iter().any(|c| c == category) {
            out.push(category.to_string());
        }
    }
    out
}
