use crate::model::{FolderId, NoteId};

/// Transient UI state: what the user is looking at. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub selected_folder: Option<FolderId>,
    pub selected_note: Option<NoteId>,
    pub search_term: String,
}

impl Session {
    pub fn select_folder(&mut self, folder: Option<FolderId>) {
        self.selected_folder = folder;
    }

    pub fn select_note(&mut self, note: Option<NoteId>) {
        self.selected_note = note;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Drops the note selection if it points at `id`.
    pub fn forget_note(&mut self, id: NoteId) {
        if self.selected_note == Some(id) {
            self.selected_note = None;
        }
    }

    /// Drops the folder selection if it points at `id`.
    pub fn forget_folder(&mut self, id: FolderId) {
        if self.selected_folder == Some(id) {
            self.selected_folder = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forgetting_only_clears_matching_selection() {
        let mut session = Session::default();
        session.select_note(Some(NoteId(1)));
        session.select_folder(Some(FolderId(2)));

        session.forget_note(NoteId(9));
        session.forget_folder(FolderId(9));
        assert_eq!(session.selected_note, Some(NoteId(1)));
        assert_eq!(session.selected_folder, Some(FolderId(2)));

        session.forget_note(NoteId(1));
        session.forget_folder(FolderId(2));
        assert_eq!(session, Session::default());
    }
}
