//! Indented text rendering for note trees.

use super::wrap::wrap_text;
use super::{ListFilter, ListOptions};
use crate::models::Note;

/// Display width lines are wrapped to.
pub(super) const WRAP_WIDTH: usize = 80;
/// Narrowest a wrapped column may get, however deep the note.
const MIN_WIDTH: usize = 20;
/// Extra indent per level of sub-note.
const SUB_INDENT: usize = 4;
/// Extra indent of `*` bullets relative to the note text.
pub(super) const BULLET_INDENT: usize = 4;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub(super) struct RenderContext<'a> {
    pub filter: &'a ListFilter,
    pub options: &'a ListOptions,
    pub base_indent: usize,
    pub show_category: bool,
}

/// Render notes and their subs depth-first.
///
/// The filter is applied to every note on its own: a hidden note's subs are
/// still visited and shown at their own depth when they match.
///
/// Example output (base indent 2):
/// ```text
///   2. [x] ship release
///              * changelog
///       3. [ ] tag build
/// ```
pub(super) fn render_tree(output: &mut String, notes: &[&Note], ctx: &RenderContext) {
    for note in notes {
        render_node(output, note, 0, ctx);
    }
}

fn render_node(output: &mut String, note: &Note, depth: usize, ctx: &RenderContext) {
    if ctx.filter.matches(note) {
        render_note(output, note, ctx.base_indent + depth * SUB_INDENT, ctx);
    }
    for sub in &note.subs {
        render_node(output, sub, depth + 1, ctx);
    }
}

fn render_note(output: &mut String, note: &Note, indent: usize, ctx: &RenderContext) {
    let checkbox = if note.checked { "[x]" } else { "[ ]" };
    let head = format!("{}. {} ", note.id, checkbox);
    let text_col = indent + head.chars().count();
    let width = WRAP_WIDTH.saturating_sub(text_col).max(MIN_WIDTH);

    let mut parts = note.text.split('*');
    let mut lines = wrap_text(parts.next().unwrap_or_default(), width).into_iter();

    push_indent(output, indent);
    match lines.next() {
        Some(first) => {
            output.push_str(&head);
            output.push_str(&first);
        }
        None => output.push_str(head.trim_end()),
    }
    output.push('\n');
    for line in lines {
        push_line(output, text_col, &line);
    }

    let bullet_col = text_col + BULLET_INDENT;
    let bullet_width = WRAP_WIDTH.saturating_sub(bullet_col + 2).max(MIN_WIDTH);
    for bullet in parts.map(str::trim).filter(|part| !part.is_empty()) {
        for (i, line) in wrap_text(bullet, bullet_width).iter().enumerate() {
            let marker = if i == 0 { "* " } else { "  " };
            push_line(output, bullet_col, &format!("{marker}{line}"));
        }
    }

    if ctx.options.verbose {
        push_line(output, text_col, &details(note, ctx.show_category));
    }
}

fn details(note: &Note, show_category: bool) -> String {
    let mut fields = Vec::new();
    if show_category {
        fields.push(format!("Category: {}", note.category));
    }
    let importance = note
        .importance
        .map_or_else(|| "none".to_string(), |importance| importance.to_string());
    fields.push(format!("Importance: {importance}"));
    fields.push(format!(
        "Created: {}",
        note.created_timestamp.format(TIME_FORMAT)
    ));
    if let Some(marked) = note.marked_timestamp {
        fields.push(format!("Marked: {}", marked.format(TIME_FORMAT)));
    }
    format!("({})", fields.join(", "))
}

fn push_indent(output: &mut String, indent: usize) {
    output.extend(std::iter::repeat(' ').take(indent));
}

fn push_line(output: &mut String, indent: usize, line: &str) {
    push_indent(output, indent);
    output.push_str(line);
    output.push('\n');
}
