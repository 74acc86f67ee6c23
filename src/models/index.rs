use std::collections::HashMap;

use super::Note;

/// Where a note sits in the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLocation {
    Root(usize),
    Sub { parent: usize, child: usize },
}

/// Flat id → location lookup over root notes and their direct subs.
///
/// Deeper sub-notes are not indexed: notes are only ever created one level
/// below a root, so mark and delete resolve ids at those two levels.
#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    locations: HashMap<u64, NoteLocation>,
}

impl NoteIndex {
    pub fn build(notes: &[Note]) -> Self {
        let mut index = Self::default();
        for (pos, note) in notes.iter().enumerate() {
            index.locations.entry(note.id).or_insert(NoteLocation::Root(pos));
        }
        for (parent, note) in notes.iter().enumerate() {
            for (child, sub) in note.subs.iter().enumerate() {
                index
                    .locations
                    .entry(sub.id)
                    .or_insert(NoteLocation::Sub { parent, child });
            }
        }
        index
    }

    pub fn get(&self, id: u64) -> Option<NoteLocation> {
        self.locations.get(&id).copied()
    }

    pub fn insert(&mut self, id: u64, location: NoteLocation) {
        self.locations.insert(id, location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn note(id: u64, subs: Vec<Note>) -> Note {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut note = Note::new(id, None, format!("note {id}"), "work".into(), None, now);
        note.subs = subs;
        note
    }

    #[test]
    fn test_indexes_roots_and_direct_subs() {
        let notes = vec![note(1, vec![note(2, vec![]), note(4, vec![])]), note(3, vec![])];
        let index = NoteIndex::build(&notes);

        assert_eq!(index.get(1), Some(NoteLocation::Root(0)));
        assert_eq!(index.get(3), Some(NoteLocation::Root(1)));
        assert_eq!(index.get(4), Some(NoteLocation::Sub { parent: 0, child: 1 }));
        assert_eq!(index.get(2), Some(NoteLocation::Sub { parent: 0, child: 0 }));
        assert!(index.get(5).is_none());
    }

    #[test]
    fn test_skips_grandchildren() {
        let notes = vec![note(1, vec![note(2, vec![note(3, vec![])])])];
        let index = NoteIndex::build(&notes);

        assert!(index.get(3).is_none());
    }

    #[test]
    fn test_root_wins_on_duplicate_id() {
        let notes = vec![note(1, vec![note(2, vec![])]), note(2, vec![])];
        let index = NoteIndex::build(&notes);

        assert_eq!(index.get(2), Some(NoteLocation::Root(1)));
    }
}
