//! Domain models for tinote.
//!
//! - [`Note`]: a node in the note forest. Root notes sit in the notebook,
//!   sub-notes sit in their parent's `subs`.
//! - [`Notebook`]: the persisted state (forest, id counter, last used
//!   category, schema version) and the in-memory note operations.
//! - [`NoteIndex`]: id → location lookup rebuilt whenever the forest is
//!   loaded or restructured.

mod index;
mod note;
mod notebook;

pub use index::*;
pub use note::*;
pub use notebook::*;
