//! Filtering and display of the note forest.
//!
//! Listing is read-only. Without a category filter root notes are grouped
//! under `Category:` headers; with one, the matching notes print as a single
//! flat list.

mod tree_render;
mod wrap;

use std::collections::BTreeMap;

use crate::models::{Note, Notebook};

use tree_render::{render_tree, RenderContext};

/// Label for notes whose category is empty.
const UNCATEGORIZED: &str = "Uncategorized";
/// Indent of root notes under a category header.
const GROUP_INDENT: usize = 2;

/// Which notes to show. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact, case-sensitive category match.
    pub category: Option<String>,
    /// Exact match. Notes with unset importance never match a set filter.
    pub importance: Option<i64>,
    /// `Some(true)` for checked notes only, `Some(false)` for unchecked only.
    pub checked: Option<bool>,
}

impl ListFilter {
    pub fn matches(&self, note: &Note) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| note.category == category)
            && self
                .importance
                .map_or(true, |importance| note.importance == Some(importance))
            && self.checked.map_or(true, |checked| note.checked == checked)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Add importance and timestamps under each note.
    pub verbose: bool,
}

/// Result of a listing. Finding nothing is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The notebook holds no notes at all.
    Empty,
    /// Notes exist but none passed the filter.
    NoMatches,
    Notes(String),
}

pub fn render_listing(book: &Notebook, filter: &ListFilter, options: &ListOptions) -> Listing {
    if book.is_empty() {
        return Listing::Empty;
    }

    let output = match filter.category {
        Some(_) => render_flat(book, filter, options),
        None => render_grouped(book, filter, options),
    };

    if output.is_empty() {
        Listing::NoMatches
    } else {
        Listing::Notes(output)
    }
}

fn render_flat(book: &Notebook, filter: &ListFilter, options: &ListOptions) -> String {
    let roots: Vec<&Note> = book.notes.iter().collect();
    let ctx = RenderContext {
        filter,
        options,
        base_indent: 0,
        show_category: true,
    };

    let mut output = String::new();
    render_tree(&mut output, &roots, &ctx);
    output
}

fn render_grouped(book: &Notebook, filter: &ListFilter, options: &ListOptions) -> String {
    let mut groups: BTreeMap<&str, Vec<&Note>> = BTreeMap::new();
    for note in &book.notes {
        groups.entry(note.category.as_str()).or_default().push(note);
    }

    let ctx = RenderContext {
        filter,
        options,
        base_indent: GROUP_INDENT,
        show_category: false,
    };

    let mut output = String::new();
    for (category, roots) in groups {
        let mut body = String::new();
        render_tree(&mut body, &roots, &ctx);
        if body.is_empty() {
            continue;
        }

        let label = if category.is_empty() {
            UNCATEGORIZED
        } else {
            category
        };
        output.push_str(&format!("Category: {label}\n"));
        output.push_str(&body);
        output.push('\n');
    }
    output
}
