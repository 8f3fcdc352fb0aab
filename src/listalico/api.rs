//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all listalico operations, whichever UI drives them.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (display indexes, ranges and folder names become ids)
//! - **Tracks the session** (selected folder and note) the way the web app's
//!   top-level state does
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout, stderr or prompts
//! - **Presentation**: returns data structures, not strings
//!
//! ## Multiple Targets
//!
//! Operations taking several indexes resolve *all* of them to ids before
//! touching anything. Trashing note `1` shifts every later index, so resolving
//! lazily would hit the wrong notes.
//!
//! ## Generic Over StorageBackend
//!
//! `ListalicoApi<B: StorageBackend>`:
//! - Production: `ListalicoApi<FsBackend>`
//! - Testing: `ListalicoApi<MemBackend>`

use crate::commands;
use crate::commands::export::ExportDocument;
use crate::commands::list::NoteFilter;
use crate::commands::update::NotePatch;
use crate::config::ListalicoConfig;
use crate::error::{ListalicoError, Result};
use crate::index::{parse_index_or_range, FolderSelector, IndexSelector};
use crate::model::{FolderId, NoteId};
use crate::session::Session;
use crate::store::{NoteStore, StorageBackend};
use std::path::{Path, PathBuf};

/// The main API facade for listalico operations.
pub struct ListalicoApi<B: StorageBackend> {
    store: NoteStore<B>,
    session: Session,
    config: ListalicoConfig,
    paths: commands::ListalicoPaths,
}

impl<B: StorageBackend> ListalicoApi<B> {
    pub fn new(store: NoteStore<B>, config: ListalicoConfig, paths: commands::ListalicoPaths) -> Self {
        Self {
            store,
            session: Session::default(),
            config,
            paths,
        }
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn paths(&self) -> &commands::ListalicoPaths {
        &self.paths
    }

    pub fn settings(&self) -> &ListalicoConfig {
        &self.config
    }

    // --- Selection ---

    pub fn select_folder(&mut self, folder: Option<&str>) -> Result<()> {
        let id = folder.map(|sel| self.resolve_folder(sel)).transpose()?;
        self.session.select_folder(id);
        Ok(())
    }

    pub fn set_search(&mut self, term: &str) {
        self.session.set_search(term);
    }

    // --- Notes ---

    /// Creates a note. Without an explicit folder it goes to the selected
    /// folder, else the first folder, else it is left unfiled.
    pub fn create_note(
        &mut self,
        folder: Option<&str>,
        title: Option<String>,
    ) -> Result<commands::CmdResult> {
        let target = match folder {
            Some(sel) => Some(self.resolve_folder(sel)?),
            None => self.default_target(),
        };
        let result = commands::create::note(&mut self.store, target, title)?;
        if let Some(note) = result.affected_notes.first() {
            self.session.select_note(Some(note.id));
        }
        Ok(result)
    }

    /// Lists active notes. Without an explicit term the session's search
    /// term applies.
    pub fn list_notes(
        &self,
        folder: Option<&str>,
        search: Option<String>,
    ) -> Result<commands::CmdResult> {
        let folder = folder.map(|sel| self.resolve_folder(sel)).transpose()?;
        let search = search.or_else(|| {
            Some(self.session.search_term.clone()).filter(|t| !t.trim().is_empty())
        });
        let filter = NoteFilter::default().in_folder(folder).matching(search);
        commands::list::run(&self.store, &filter)
    }

    pub fn view_notes<I: AsRef<str>>(&self, indexes: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_indexes(indexes)?;
        let indexes = commands::helpers::expand_selectors(&self.store, &selectors)?;
        commands::view::run(&self.store, &indexes)
    }

    pub fn update_note(&mut self, index: &str, patch: NotePatch) -> Result<commands::CmdResult> {
        let id = self.resolve_active_note(index)?;
        commands::update::run(&mut self.store, id, patch)
    }

    pub fn toggle_tasks<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_active_notes(indexes)?;
        self.for_each_note(ids, commands::update::toggle_task)
    }

    pub fn add_category(&mut self, index: &str, category: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_active_note(index)?;
        commands::update::add_category(&mut self.store, id, category)
    }

    pub fn remove_category(&mut self, index: &str, category: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_active_note(index)?;
        commands::update::remove_category(&mut self.store, id, category)
    }

    /// Moves notes into `folder`, or unfiles them when `folder` is `None`.
    pub fn move_notes<I: AsRef<str>>(
        &mut self,
        indexes: &[I],
        folder: Option<&str>,
    ) -> Result<commands::CmdResult> {
        let target = folder.map(|sel| self.resolve_folder(sel)).transpose()?;
        let ids = self.resolve_active_notes(indexes)?;
        self.for_each_note(ids, |store, id| {
            commands::move_note::run(store, id, target)
        })
    }

    pub fn trash_notes<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_active_notes(indexes)?;
        for id in &ids {
            self.session.forget_note(*id);
        }
        self.for_each_note(ids, commands::trash::note)
    }

    pub fn restore_notes<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_trashed_notes(indexes)?;
        self.for_each_note(ids, commands::restore::note)
    }

    pub fn purge_notes<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<commands::CmdResult> {
        let ids = self.resolve_trashed_notes(indexes)?;
        self.for_each_note(ids, commands::purge::note)
    }

    // --- Folders ---

    pub fn list_folders(&self) -> Result<commands::CmdResult> {
        commands::folders::list(&self.store)
    }

    /// Creates a folder, colored with the configured default unless a color
    /// is given.
    pub fn create_folder(
        &mut self,
        name: Option<String>,
        color: Option<&str>,
    ) -> Result<commands::CmdResult> {
        let color = color.unwrap_or(&self.config.default_folder_color).to_string();
        commands::create::folder(&mut self.store, name, &color)
    }

    pub fn rename_folder(&mut self, folder: &str, name: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_folder(folder)?;
        commands::folders::rename(&mut self.store, id, name)
    }

    pub fn recolor_folder(&mut self, folder: &str, color: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_folder(folder)?;
        commands::folders::recolor(&mut self.store, id, color)
    }

    pub fn trash_folder(&mut self, folder: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_folder(folder)?;
        let result = commands::trash::folder(&mut self.store, id)?;
        self.session.forget_folder(id);
        for note in &result.affected_notes {
            self.session.forget_note(note.id);
        }
        Ok(result)
    }

    pub fn restore_folder(&mut self, folder: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_trashed_folder(folder)?;
        commands::restore::folder(&mut self.store, id)
    }

    pub fn purge_folder(&mut self, folder: &str) -> Result<commands::CmdResult> {
        let id = self.resolve_trashed_folder(folder)?;
        commands::purge::folder(&mut self.store, id)
    }

    // --- Trash ---

    pub fn list_trash(&self) -> Result<commands::CmdResult> {
        commands::list::trash(&self.store)
    }

    pub fn empty_trash(&mut self) -> Result<commands::CmdResult> {
        commands::purge::all(&mut self.store)
    }

    // --- Data ---

    /// Writes a full backup into `dir`, or the configured export directory,
    /// or the current directory.
    pub fn export(&self, dir: Option<&Path>) -> Result<commands::CmdResult> {
        let dir: PathBuf = dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.export_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        commands::export::run(&self.store, &dir)
    }

    pub fn export_document(&self) -> ExportDocument {
        commands::export::document(&self.store)
    }

    /// Parses and validates a backup without touching the store.
    pub fn parse_import(&self, raw: &str) -> Result<ExportDocument> {
        commands::import::parse_document(raw)
    }

    /// Replaces all data with `doc`. Selects the first imported folder.
    pub fn import(&mut self, doc: ExportDocument) -> Result<commands::CmdResult> {
        let result =
            commands::import::run(&mut self.store, doc, self.config.backup_before_import)?;
        let first = self.store.data().folders.first().map(|f| f.id);
        self.session.select_folder(first);
        self.session.select_note(None);
        Ok(result)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    // --- Resolution ---

    pub fn resolve_folder(&self, selector: &str) -> Result<FolderId> {
        let selector = parse_folder_selector(selector)?;
        commands::helpers::resolve_folder(&self.store, &selector)
    }

    fn resolve_trashed_folder(&self, selector: &str) -> Result<FolderId> {
        let selector = parse_folder_selector(selector)?;
        commands::helpers::resolve_trashed_folder(&self.store, &selector)
    }

    fn resolve_active_note(&self, index: &str) -> Result<NoteId> {
        let ids = self.resolve_active_notes(&[index])?;
        match ids.as_slice() {
            [id] => Ok(*id),
            _ => Err(ListalicoError::Api(format!(
                "Expected a single note, got: {}",
                index
            ))),
        }
    }

    fn resolve_active_notes<I: AsRef<str>>(&self, indexes: &[I]) -> Result<Vec<NoteId>> {
        let selectors = parse_indexes(indexes)?;
        if let Some(bad) = selectors.iter().find(|s| s.is_trashed()) {
            return Err(ListalicoError::Api(format!(
                "Note {} is in the trash; restore it first",
                bad
            )));
        }
        self.resolve_selectors(&selectors)
    }

    fn resolve_trashed_notes<I: AsRef<str>>(&self, indexes: &[I]) -> Result<Vec<NoteId>> {
        let selectors = parse_indexes(indexes)?;
        if let Some(bad) = selectors.iter().find(|s| !s.is_trashed()) {
            return Err(ListalicoError::Api(format!(
                "Note {} is not in the trash (trashed notes are d1, d2, ...)",
                bad
            )));
        }
        self.resolve_selectors(&selectors)
    }

    fn resolve_selectors(&self, selectors: &[IndexSelector]) -> Result<Vec<NoteId>> {
        let indexes = commands::helpers::expand_selectors(&self.store, selectors)?;
        commands::helpers::resolve_notes(&self.store, &indexes)
    }

    fn default_target(&self) -> Option<FolderId> {
        let data = self.store.data();
        self.session
            .selected_folder
            .filter(|id| data.folder(*id).is_some())
            .or_else(|| data.folders.first().map(|f| f.id))
    }

    fn for_each_note<F>(&mut self, ids: Vec<NoteId>, mut op: F) -> Result<commands::CmdResult>
    where
        F: FnMut(&mut NoteStore<B>, NoteId) -> Result<commands::CmdResult>,
    {
        let mut result = commands::CmdResult::default();
        for id in ids {
            result.absorb(op(&mut self.store, id)?);
        }
        Ok(result)
    }
}

/// Parses indexes and ranges. Ranges stay unexpanded until resolution.
fn parse_indexes<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<IndexSelector>> {
    if inputs.is_empty() {
        return Err(ListalicoError::Api("No note index given".into()));
    }
    inputs
        .iter()
        .map(|input| parse_index_or_range(input.as_ref().trim()).map_err(ListalicoError::Api))
        .collect()
}

fn parse_folder_selector(input: &str) -> Result<FolderSelector> {
    input.parse().map_err(ListalicoError::Api)
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, ListalicoPaths, MessageLevel};
