use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CreateNoteInput, CreateSubNoteInput, Note, NoteIndex, NoteLocation};
use crate::error::{Result, StoreError};

/// Category used when nothing has been created yet.
pub const DEFAULT_CATEGORY: &str = "unknown";

/// The whole persisted state: the note forest plus its bookkeeping.
///
/// # Invariants
/// - `max_id` is the highest id ever handed out. New ids are `max_id + 1`,
///   so ids are never reused, even after delete or clear.
/// - `last_category` is updated by every root-note create and only by that.
///
/// The operations here are pure in-memory mutations. Persisting them is the
/// job of [`Database`](crate::db::Database).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub max_id: u64,
    #[serde(default = "default_category")]
    pub last_category: String,
    pub version: String,
    #[serde(skip)]
    index: NoteIndex,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl PartialEq for Notebook {
    fn eq(&self, other: &Self) -> bool {
        self.notes == other.notes
            && self.max_id == other.max_id
            && self.last_category == other.last_category
            && self.version == other.version
    }
}

impl Notebook {
    /// An empty notebook stamped with `version`.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            notes: Vec::new(),
            max_id: 0,
            last_category: DEFAULT_CATEGORY.to_string(),
            version: version.into(),
            index: NoteIndex::default(),
        }
    }

    /// Rebuild the id index. Must be called after deserializing.
    pub fn reindex(&mut self) {
        self.index = NoteIndex::build(&self.notes);
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Look up a root note or a direct sub-note by id.
    pub fn get(&self, id: u64) -> Option<&Note> {
        match self.index.get(id)? {
            NoteLocation::Root(pos) => self.notes.get(pos),
            NoteLocation::Sub { parent, child } => self.notes.get(parent)?.subs.get(child),
        }
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Note> {
        match self.index.get(id)? {
            NoteLocation::Root(pos) => self.notes.get_mut(pos),
            NoteLocation::Sub { parent, child } => {
                self.notes.get_mut(parent)?.subs.get_mut(child)
            }
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.max_id += 1;
        self.max_id
    }

    // ============================================================
    // Note operations
    // ============================================================

    /// Append a new root note and remember its category.
    pub fn create(&mut self, input: CreateNoteInput, now: NaiveDateTime) -> Note {
        let category = input
            .category
            .unwrap_or_else(|| self.last_category.clone());
        let id = self.allocate_id();
        let note = Note::new(id, None, input.text, category.clone(), input.importance, now);

        self.notes.push(note.clone());
        self.index
            .insert(id, NoteLocation::Root(self.notes.len() - 1));
        self.last_category = category;
        note
    }

    /// Append a sub-note under a root note. Fails without touching any state
    /// when `parent_id` is not a root note.
    pub fn create_sub(
        &mut self,
        parent_id: u64,
        input: CreateSubNoteInput,
        now: NaiveDateTime,
    ) -> Result<Note> {
        let Some(NoteLocation::Root(parent)) = self.index.get(parent_id) else {
            return Err(StoreError::ParentNotFound(parent_id));
        };

        let category = self.notes[parent].category.clone();
        let id = self.allocate_id();
        let note = Note::new(
            id,
            Some(parent_id),
            input.text,
            category,
            input.importance,
            now,
        );

        let subs = &mut self.notes[parent].subs;
        subs.push(note.clone());
        let child = subs.len() - 1;
        self.index.insert(id, NoteLocation::Sub { parent, child });
        Ok(note)
    }

    /// Set the checked state and stamp the mark time.
    pub fn mark(&mut self, id: u64, checked: bool, now: NaiveDateTime) -> Result<Note> {
        let note = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        note.checked = checked;
        note.marked_timestamp = Some(now);
        Ok(note.clone())
    }

    /// Remove a note. Removing a root note takes its subs with it.
    pub fn delete(&mut self, id: u64) -> Result<Note> {
        let removed = match self.index.get(id).ok_or(StoreError::NotFound(id))? {
            NoteLocation::Root(pos) => self.notes.remove(pos),
            NoteLocation::Sub { parent, child } => self.notes[parent].subs.remove(child),
        };
        self.reindex();
        Ok(removed)
    }

    /// Remove every root note in `category`, or everything when `None`.
    /// Returns the number of root notes removed. `max_id` and
    /// `last_category` are left alone.
    pub fn clear(&mut self, category: Option<&str>) -> usize {
        let before = self.notes.len();
        match category {
            Some(category) => self.notes.retain(|note| note.category != category),
            None => self.notes.clear(),
        }
        self.reindex();
        before - self.notes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn add(book: &mut Notebook, text: &str, category: Option<&str>) -> Note {
        book.create(
            CreateNoteInput {
                text: text.to_string(),
                category: category.map(str::to_string),
                importance: None,
            },
            at(8),
        )
    }

    fn add_sub(book: &mut Notebook, parent: u64, text: &str) -> Result<Note> {
        book.create_sub(
            parent,
            CreateSubNoteInput {
                text: text.to_string(),
                importance: Some(1),
            },
            at(9),
        )
    }

    #[test]
    fn test_ids_increase_across_delete_and_clear() {
        let mut book = Notebook::empty("1.2.0");
        let a = add(&mut book, "a", Some("work"));
        let b = add(&mut book, "b", None);
        book.delete(b.id).unwrap();
        let c = add(&mut book, "c", None);
        book.clear(None);
        let d = add(&mut book, "d", None);

        assert_eq!(vec![a.id, b.id, c.id, d.id], vec![1, 2, 3, 4]);
        assert_eq!(book.max_id, 4);
    }

    #[test]
    fn test_omitted_category_reuses_last_category() {
        let mut book = Notebook::empty("1.2.0");
        assert_eq!(add(&mut book, "first", None).category, DEFAULT_CATEGORY);

        add(&mut book, "groceries", Some("home"));
        let next = add(&mut book, "milk", None);

        assert_eq!(next.category, "home");
        assert_eq!(book.last_category, "home");
    }

    #[test]
    fn test_sub_inherits_category_and_keeps_last_category() {
        let mut book = Notebook::empty("1.2.0");
        let parent = add(&mut book, "release", Some("work"));
        add(&mut book, "laundry", Some("home"));

        let sub = add_sub(&mut book, parent.id, "tag build").unwrap();

        assert_eq!(sub.category, "work");
        assert_eq!(sub.parent, Some(parent.id));
        assert_eq!(book.last_category, "home");
        assert_eq!(book.notes[0].subs.len(), 1);
        assert_eq!(book.get(sub.id).map(|n| n.text.as_str()), Some("tag build"));
    }

    #[test]
    fn test_sub_with_missing_parent_changes_nothing() {
        let mut book = Notebook::empty("1.2.0");
        add(&mut book, "a", Some("work"));
        let before = book.clone();

        let err = add_sub(&mut book, 42, "orphan").unwrap_err();

        assert!(matches!(err, StoreError::ParentNotFound(42)));
        assert_eq!(book, before);
    }

    #[test]
    fn test_sub_cannot_attach_below_a_sub() {
        let mut book = Notebook::empty("1.2.0");
        let root = add(&mut book, "a", Some("work"));
        let sub = add_sub(&mut book, root.id, "b").unwrap();

        let err = add_sub(&mut book, sub.id, "c").unwrap_err();
        assert!(matches!(err, StoreError::ParentNotFound(id) if id == sub.id));
        assert_eq!(book.max_id, 2);
    }

    #[test]
    fn test_mark_and_unmark_keep_timestamp() {
        let mut book = Notebook::empty("1.2.0");
        let root = add(&mut book, "a", Some("work"));
        let sub = add_sub(&mut book, root.id, "b").unwrap();

        let marked = book.mark(sub.id, true, at(10)).unwrap();
        assert!(marked.checked);
        assert_eq!(marked.marked_timestamp, Some(at(10)));

        let unmarked = book.mark(sub.id, false, at(11)).unwrap();
        assert!(!unmarked.checked);
        assert_eq!(unmarked.marked_timestamp, Some(at(11)));
        assert!(!book.notes[0].subs[0].checked);
    }

    #[test]
    fn test_mark_unknown_id() {
        let mut book = Notebook::empty("1.2.0");
        assert!(matches!(book.mark(7, true, at(10)), Err(StoreError::NotFound(7))));
    }

    #[test]
    fn test_delete_root_cascades_and_sub_keeps_siblings() {
        let mut book = Notebook::empty("1.2.0");
        let a = add(&mut book, "a", Some("work"));
        let a1 = add_sub(&mut book, a.id, "a1").unwrap();
        let a2 = add_sub(&mut book, a.id, "a2").unwrap();
        let b = add(&mut book, "b", None);
        let b1 = add_sub(&mut book, b.id, "b1").unwrap();

        book.delete(a1.id).unwrap();
        assert_eq!(book.notes[0].subs.len(), 1);
        assert_eq!(book.notes[0].subs[0].id, a2.id);

        book.delete(a.id).unwrap();
        assert_eq!(book.notes.len(), 1);
        assert!(book.get(a2.id).is_none());
        assert_eq!(book.get(b1.id).map(|n| n.id), Some(b1.id));
        assert!(matches!(book.delete(a.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_clear_by_category() {
        let mut book = Notebook::empty("1.2.0");
        let w = add(&mut book, "w", Some("work"));
        add_sub(&mut book, w.id, "w1").unwrap();
        add(&mut book, "h", Some("home"));
        add(&mut book, "w2", Some("work"));
        add(&mut book, "h2", Some("home"));

        let removed = book.clear(Some("work"));

        assert_eq!(removed, 2);
        assert!(book.notes.iter().all(|n| n.category == "home"));
        assert_eq!(book.max_id, 5);
        assert_eq!(book.last_category, "home");
    }

    #[test]
    fn test_clear_all_keeps_counters() {
        let mut book = Notebook::empty("1.2.0");
        add(&mut book, "a", Some("work"));
        add(&mut book, "b", Some("home"));

        assert_eq!(book.clear(None), 2);
        assert!(book.is_empty());
        assert_eq!(book.max_id, 2);
        assert_eq!(book.last_category, "home");
    }
}
