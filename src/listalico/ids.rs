//! # Id Generation
//!
//! Ids are plain integers so that backups from the browser app (which used
//! `Date.now()` as identity) import unchanged. New ids are still close to the
//! creation time in milliseconds, but the generator never hands out the same
//! value twice: each id is `max(now_millis, last + 1)`.
//!
//! The generator is seeded from the largest id already present in the store,
//! so ids stay unique across restarts and after an import, even if the clock
//! moved backwards.

use crate::model::{FolderId, NoteId};
use chrono::Utc;

#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn seeded(floor: i64) -> Self {
        Self { last: floor }
    }

    /// Raises the floor so that future ids are greater than `id`.
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }

    pub fn next_raw(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last.saturating_add(1));
        self.last = id;
        id
    }

    pub fn next_note_id(&mut self) -> NoteId {
        NoteId(self.next_raw())
    }

    pub fn next_folder_id(&mut self) -> FolderId {
        FolderId(self.next_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_in_a_tight_loop_are_unique_and_increasing() {
        let mut ids = IdGenerator::default();
        let issued: Vec<i64> = (0..1000).map(|_| ids.next_raw()).collect();

        assert!(issued.windows(2).all(|w| w[0] < w[1]));
        let unique: HashSet<_> = issued.iter().collect();
        assert_eq!(unique.len(), issued.len());
    }

    #[test]
    fn seeded_generator_skips_past_future_ids() {
        let future = Utc::now().timestamp_millis() + 1_000_000;
        let mut ids = IdGenerator::seeded(future);
        assert_eq!(ids.next_raw(), future + 1);
    }

    #[test]
    fn observe_only_raises_the_floor() {
        let far = Utc::now().timestamp_millis() + 5_000_000;
        let mut ids = IdGenerator::seeded(far);
        ids.observe(3);
        assert_eq!(ids.next_raw(), far + 1);
    }

    #[test]
    fn ids_are_close_to_wall_clock() {
        let before = Utc::now().timestamp_millis();
        let id = IdGenerator::default().next_note_id();
        assert!(id.0 >= before);
    }
}
