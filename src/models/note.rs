use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single note in the forest.
///
/// Root notes live directly in [`Notebook::notes`](super::Notebook); sub-notes
/// live in their parent's `subs` and carry the parent's id in `parent`.
/// Ids are unique across the whole forest, nested sub-notes included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    /// Id of the owning note. Only present on sub-notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    /// Free-form text. A `*` starts a display bullet, it does not nest notes.
    #[serde(rename = "note", default)]
    pub text: String,
    pub category: String,
    /// `None` means unset, which is distinct from zero.
    #[serde(default)]
    pub importance: Option<i64>,
    pub created_timestamp: NaiveDateTime,
    /// Last time the checked state was set. Survives an unmark.
    #[serde(default)]
    pub marked_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub subs: Vec<Note>,
}

impl Note {
    pub(crate) fn new(
        id: u64,
        parent: Option<u64>,
        text: String,
        category: String,
        importance: Option<i64>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            parent,
            text,
            category,
            importance,
            created_timestamp: now,
            marked_timestamp: None,
            checked: false,
            subs: Vec::new(),
        }
    }
}

/// Input for creating a root note.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteInput {
    pub text: String,
    /// Falls back to the notebook's last used category when `None`.
    pub category: Option<String>,
    pub importance: Option<i64>,
}

/// Input for creating a sub-note. The category is always inherited.
#[derive(Debug, Clone, Default)]
pub struct CreateSubNoteInput {
    pub text: String,
    pub importance: Option<i64>,
}
