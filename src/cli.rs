//! Command-line surface for the `ti` binary.
//!
//! Arguments are parsed and type-checked by clap; [`execute`] maps a parsed
//! command onto the store and returns the line(s) to print.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::db::Database;
use crate::error::Result;
use crate::list::{render_listing, ListFilter, ListOptions, Listing};
use crate::models::{CreateNoteInput, CreateSubNoteInput};

#[derive(Debug, Parser)]
#[command(name = "ti")]
#[command(about = "A command-line tool for taking quick notes")]
pub struct Cli {
    /// Notes data file (defaults to $TI_NOTES_FILE, then ~/.ti_notes.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new note
    Add {
        /// The content of the note
        text: String,

        /// Category for the note
        #[arg(value_name = "CATEGORY")]
        category_arg: Option<String>,

        /// Importance level for the note
        #[arg(value_name = "IMPORTANCE")]
        importance_arg: Option<i64>,

        /// Category for the note. If none is given, the last category is used
        #[arg(short, long)]
        category: Option<String>,

        /// Importance level for the note
        #[arg(short, long)]
        importance: Option<i64>,
    },
    /// Add a sub-note under an existing note
    Sub {
        /// ID of the parent note
        parent_id: u64,

        /// The content of the sub-note
        text: String,

        /// Importance level for the sub-note
        #[arg(short, long)]
        importance: Option<i64>,
    },
    /// List notes
    List {
        /// Only notes in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only notes with this importance level
        #[arg(short, long)]
        importance: Option<i64>,

        /// Show importance and timestamps with each note
        #[arg(short, long)]
        verbose: bool,

        /// Only checked notes
        #[arg(short, long, conflicts_with = "unmarked")]
        marked: bool,

        /// Only unchecked notes
        #[arg(short, long)]
        unmarked: bool,
    },
    /// Mark a note as checked or unchecked
    Mark {
        /// ID of the note to mark
        id: u64,

        /// Unmark the note instead of marking it
        #[arg(short, long)]
        uncheck: bool,
    },
    /// Delete a note and its sub-notes
    Delete {
        /// ID of the note to delete
        id: u64,
    },
    /// Clear all notes, or only the notes in one category
    Clear {
        /// Category of notes to clear
        #[arg(short, long)]
        category: Option<String>,
    },
}

/// Run one command against the store and return the text to print.
pub fn execute(command: Commands, db: &Database) -> Result<String> {
    match command {
        Commands::Add {
            text,
            category_arg,
            importance_arg,
            category,
            importance,
        } => {
            let note = db.create_note(CreateNoteInput {
                text,
                category: category.or(category_arg),
                importance: importance.or(importance_arg),
            })?;
            Ok(format!("Note {} added to '{}'.", note.id, note.category))
        }
        Commands::Sub {
            parent_id,
            text,
            importance,
        } => {
            let note = db.create_sub_note(parent_id, CreateSubNoteInput { text, importance })?;
            Ok(format!(
                "Sub-note {} added under note {}.",
                note.id, parent_id
            ))
        }
        Commands::List {
            category,
            importance,
            verbose,
            marked,
            unmarked,
        } => {
            let checked = match (marked, unmarked) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let filter = ListFilter {
                category,
                importance,
                checked,
            };
            let book = db.load()?;
            Ok(match render_listing(&book, &filter, &ListOptions { verbose }) {
                Listing::Empty => "No notes found.".to_string(),
                Listing::NoMatches => "No notes found matching the given filters.".to_string(),
                Listing::Notes(output) => output.trim_end().to_string(),
            })
        }
        Commands::Mark { id, uncheck } => {
            let note = db.mark_note(id, !uncheck)?;
            let verb = if note.checked { "marked" } else { "unmarked" };
            Ok(format!("Note {} {}.", note.id, verb))
        }
        Commands::Delete { id } => {
            let note = db.delete_note(id)?;
            Ok(format!("Note {} deleted.", note.id))
        }
        Commands::Clear { category } => {
            db.clear_notes(category.as_deref())?;
            Ok(match category {
                Some(category) => format!("Cleared all notes in category '{category}'."),
                None => "Cleared all notes.".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_add_with_positional_and_flags() {
        let cli = Cli::try_parse_from(["ti", "add", "buy milk", "home", "2"]).unwrap();
        match cli.command {
            Some(Commands::Add {
                category_arg,
                importance_arg,
                ..
            }) => {
                assert_eq!(category_arg.as_deref(), Some("home"));
                assert_eq!(importance_arg, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["ti", "add", "x", "-c", "work", "-i", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Add { category: Some(ref c), importance: Some(5), .. }) if c == "work"
        ));
    }

    #[test]
    fn test_marked_and_unmarked_conflict() {
        assert!(Cli::try_parse_from(["ti", "list", "-m", "-u"]).is_err());
    }

    #[test]
    fn test_non_integer_id_is_rejected() {
        assert!(Cli::try_parse_from(["ti", "mark", "abc"]).is_err());
        assert!(Cli::try_parse_from(["ti", "add", "x", "-i", "high"]).is_err());
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["ti"]).unwrap();
        assert!(cli.command.is_none());
    }
}
