//! # Display Indexes
//!
//! Stored ids are large integers (creation milliseconds), which are unpleasant
//! to type. UIs address items by short display indexes instead:
//!
//! - Notes: `1`, `2`, … follow the display order (see [`sort_notes`]);
//!   `d1`, `d2`, … address the trash, most recently trashed first.
//! - Folders: `1`, `2`, … are positions in the folder list, `d1`, `d2`, …
//!   address trashed folders. A folder may also be selected by name.
//!
//! Indexes are always assigned over the complete collection, before any
//! filtering, so `3` means the same note whether or not a search is active.

use crate::model::{Folder, FolderId, Note, Priority, TrashedFolder, TrashedNote};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    Active(usize),
    Trashed(usize),
}

impl DisplayIndex {
    /// The 1-based position within its list.
    pub fn position(self) -> usize {
        match self {
            DisplayIndex::Active(n) | DisplayIndex::Trashed(n) => n,
        }
    }

    /// Same kind, another position.
    pub fn at(self, position: usize) -> DisplayIndex {
        match self {
            DisplayIndex::Active(_) => DisplayIndex::Active(position),
            DisplayIndex::Trashed(_) => DisplayIndex::Trashed(position),
        }
    }

    pub fn is_trashed(self) -> bool {
        matches!(self, DisplayIndex::Trashed(_))
    }
}

impl std::fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayIndex::Active(i) => write!(f, "{}", i),
            DisplayIndex::Trashed(i) => write!(f, "d{}", i),
        }
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('d') {
            if let Ok(n) = rest.parse::<usize>() {
                if n > 0 {
                    return Ok(DisplayIndex::Trashed(n));
                }
            }
        }
        if let Ok(n) = s.parse::<usize>() {
            if n > 0 {
                return Ok(DisplayIndex::Active(n));
            }
        }
        Err(format!("Invalid index format: {}", s))
    }
}

/// One index or an inclusive range, as typed. Ranges stay unexpanded until
/// they are matched against a list, so `1-1000000` costs nothing up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSelector {
    Single(DisplayIndex),
    Range(DisplayIndex, DisplayIndex),
}

impl IndexSelector {
    pub fn is_trashed(&self) -> bool {
        match self {
            IndexSelector::Single(idx) | IndexSelector::Range(idx, _) => idx.is_trashed(),
        }
    }

    /// Expands against a list holding `len` items of the selector's kind.
    ///
    /// A range is clipped to the end of the list. A single index, or a range
    /// starting past the end, is an error.
    pub fn expand(self, len: usize) -> Result<Vec<DisplayIndex>, String> {
        let (start, end) = match self {
            IndexSelector::Single(idx) => (idx, idx),
            IndexSelector::Range(start, end) => (start, end),
        };
        if start.position() > len {
            return Err(format!("Note {} not found", start));
        }
        let last = end.position().min(len);
        Ok((start.position()..=last).map(|p| start.at(p)).collect())
    }
}

impl std::fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexSelector::Single(idx) => write!(f, "{}", idx),
            IndexSelector::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// Parses a single index or a range such as `2-4` or `d1-d3`.
///
/// Both endpoints must be of the same kind and start must be <= end.
/// Whether the indexes exist is checked later, during resolution.
pub fn parse_index_or_range(s: &str) -> Result<IndexSelector, String> {
    if let Some(dash_pos) = s.find('-') {
        if dash_pos > 0 {
            let start = DisplayIndex::from_str(&s[..dash_pos])?;
            let end = DisplayIndex::from_str(&s[dash_pos + 1..])?;
            if start.is_trashed() != end.is_trashed() {
                return Err(format!(
                    "Invalid range: cannot mix index types ({} and {})",
                    start, end
                ));
            }
            if start.position() > end.position() {
                return Err(format!(
                    "Invalid range: start ({}) must be <= end ({})",
                    start, end
                ));
            }
            return Ok(IndexSelector::Range(start, end));
        }
    }
    DisplayIndex::from_str(s).map(IndexSelector::Single)
}

/// How a UI refers to a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelector {
    Position(usize),
    Trashed(usize),
    Name(String),
}

impl FromStr for FolderSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Folder selector cannot be empty".to_string());
        }
        match DisplayIndex::from_str(s) {
            Ok(DisplayIndex::Active(n)) => Ok(FolderSelector::Position(n)),
            Ok(DisplayIndex::Trashed(n)) => Ok(FolderSelector::Trashed(n)),
            Err(_) => Ok(FolderSelector::Name(s.to_string())),
        }
    }
}

impl std::fmt::Display for FolderSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderSelector::Position(n) => write!(f, "{}", n),
            FolderSelector::Trashed(n) => write!(f, "d{}", n),
            FolderSelector::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayNote {
    pub note: Note,
    pub index: DisplayIndex,
    /// Name of the folder the note is filed in. `None` when unfiled or when
    /// the folder no longer exists.
    pub folder_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DisplayTrashedNote {
    pub note: TrashedNote,
    pub index: DisplayIndex,
}

#[derive(Debug, Clone)]
pub struct DisplayFolder {
    pub folder: Folder,
    pub position: usize,
    pub note_count: usize,
}

#[derive(Debug, Clone)]
pub struct DisplayTrashedFolder {
    pub folder: TrashedFolder,
    pub index: DisplayIndex,
}

/// Pairwise precedence of two notes. Between two tasks an open one comes
/// before a completed one. Otherwise higher priority comes first, then the
/// more recently updated note, then the higher id.
///
/// Once tasks and plain notes mix this is not transitive: a completed high
/// task precedes a plain medium note, which precedes an open low task, which
/// precedes the completed one. Never hand it to `sort_by`; lists are arranged
/// with [`sort_notes`].
pub fn note_order(a: &Note, b: &Note) -> Ordering {
    if a.is_task && b.is_task && a.completed != b.completed {
        return a.completed.cmp(&b.completed);
    }
    rank_order(a, b)
}

fn rank_order(a: &Note, b: &Note) -> Ordering {
    Priority::rank(b.priority)
        .cmp(&Priority::rank(a.priority))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Arranges notes for display.
///
/// Notes are ranked by priority and recency first. The slots held by tasks
/// are then refilled with the open tasks followed by the completed ones, each
/// group in ranked order. Plain notes never move and every pair of tasks
/// follows [`note_order`]; a task lands on the other side of a plain note
/// only where `note_order` is cyclic.
pub fn sort_notes(notes: &mut [&Note]) {
    notes.sort_by(|a, b| rank_order(a, b));

    let slots: Vec<usize> = notes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_task)
        .map(|(i, _)| i)
        .collect();
    let (open, done): (Vec<&Note>, Vec<&Note>) =
        slots.iter().map(|&i| notes[i]).partition(|n| !n.completed);
    for (slot, note) in slots.into_iter().zip(open.into_iter().chain(done)) {
        notes[slot] = note;
    }
}

/// Active notes in display order, position `i` being index `i + 1`.
pub fn ranked_notes(notes: &[Note]) -> Vec<&Note> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sort_notes(&mut sorted);
    sorted
}

/// Trashed notes, most recently trashed first.
pub fn ranked_trashed_notes(trashed: &[TrashedNote]) -> Vec<&TrashedNote> {
    let mut sorted: Vec<&TrashedNote> = trashed.iter().collect();
    sorted.sort_by(|a, b| {
        b.deleted_at
            .cmp(&a.deleted_at)
            .then_with(|| b.note.id.cmp(&a.note.id))
    });
    sorted
}

pub fn folder_name(folders: &[Folder], id: Option<FolderId>) -> Option<String> {
    let id = id?;
    folders.iter().find(|f| f.id == id).map(|f| f.name.clone())
}

/// Assigns `Active` indexes to notes in display order.
pub fn index_notes(notes: &[Note], folders: &[Folder]) -> Vec<DisplayNote> {
    ranked_notes(notes)
        .into_iter()
        .enumerate()
        .map(|(i, note)| DisplayNote {
            note: note.clone(),
            index: DisplayIndex::Active(i + 1),
            folder_name: folder_name(folders, note.folder_id),
        })
        .collect()
}

/// Assigns `Trashed` indexes, most recently trashed first.
pub fn index_trashed_notes(trashed: &[TrashedNote]) -> Vec<DisplayTrashedNote> {
    ranked_trashed_notes(trashed)
        .into_iter()
        .enumerate()
        .map(|(i, note)| DisplayTrashedNote {
            note: note.clone(),
            index: DisplayIndex::Trashed(i + 1),
        })
        .collect()
}

pub fn index_trashed_folders(trashed: &[TrashedFolder]) -> Vec<DisplayTrashedFolder> {
    let mut sorted: Vec<&TrashedFolder> = trashed.iter().collect();
    sorted.sort_by(|a, b| {
        b.deleted_at
            .cmp(&a.deleted_at)
            .then_with(|| b.folder.id.cmp(&a.folder.id))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, folder)| DisplayTrashedFolder {
            folder: folder.clone(),
            index: DisplayIndex::Trashed(i + 1),
        })
        .collect()
}
