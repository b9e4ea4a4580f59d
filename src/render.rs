//! Projection of a diff onto each side's markup.
//!
//! The base side shows deletions, the compare side shows insertions. Output is
//! a flat paragraph structure: `<p>` blocks split on blank lines, `<br>` for
//! single newlines, and `<span>` highlights that never cross either.

use crate::config::RenderSettings;
use crate::constant::{DELETION_CLASS, INSERTION_CLASS};
use crate::diff::{ChangeKind, DiffPart, DiffResult};
use tracing::debug;

/// Which document a rendering is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Compare,
}

impl Side {
    /// Parts of this kind are highlighted on this side
    pub fn highlighted_kind(self) -> ChangeKind {
        match self {
            Side::Base => ChangeKind::Removed,
            Side::Compare => ChangeKind::Added,
        }
    }

    /// Parts of this kind do not exist on this side
    pub fn omitted_kind(self) -> ChangeKind {
        match self {
            Side::Base => ChangeKind::Added,
            Side::Compare => ChangeKind::Removed,
        }
    }

    pub fn highlight_class(self) -> &'static str {
        match self {
            Side::Base => DELETION_CLASS,
            Side::Compare => INSERTION_CLASS,
        }
    }
}

/// Mark deletions against the base document's markup
pub fn mark_base(diff: &DiffResult, base_markup: &str, options: &RenderSettings) -> String {
    mark_side(diff.parts(), base_markup, Side::Base, options)
}

/// Mark insertions against the compare document's markup
pub fn mark_compare(diff: &DiffResult, compare_markup: &str, options: &RenderSettings) -> String {
    mark_side(diff.parts(), compare_markup, Side::Compare, options)
}

pub fn mark_side(parts: &[DiffPart], markup: &str, side: Side, options: &RenderSettings) -> String {
    let highlighted = side.highlighted_kind();
    let relevant = parts.iter().filter(|p| p.kind == highlighted).count();

    // Highlighting inside table cells is unreliable; keep the structure instead
    if has_table(markup) && (relevant == 0 || relevant > options.dense_table_threshold) {
        debug!(
            "Keeping original {:?} markup: table with {} highlighted parts",
            side, relevant
        );
        return markup.to_string();
    }

    let mut writer = MarkupWriter::default();
    for part in parts {
        if part.kind == side.omitted_kind() {
            continue;
        }
        let class = (part.kind == highlighted && part.char_len() >= options.min_highlight_chars)
            .then(|| side.highlight_class());
        writer.push(&part.value, class);
    }
    writer.finish()
}

fn has_table(markup: &str) -> bool {
    markup.to_ascii_lowercase().contains("<table")
}

/// Escape the five HTML metacharacters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#039;"),
        _ => out.push(c),
    }
}

/// Plain text as paragraph markup, with no highlighting
pub fn text_to_markup(text: &str) -> String {
    let mut writer = MarkupWriter::default();
    writer.push(text, None);
    writer.finish()
}

/// Accumulates escaped text and keeps highlight spans balanced
#[derive(Default)]
struct MarkupWriter {
    out: String,
    pending_newlines: usize,
    open_class: Option<&'static str>,
}

impl MarkupWriter {
    fn push(&mut self, text: &str, class: Option<&'static str>) {
        for c in text.chars() {
            if c == '\n' {
                self.pending_newlines += 1;
                continue;
            }
            self.flush_newlines();
            if self.open_class != class {
                self.close_span();
                if let Some(class) = class {
                    self.out.push_str("<span class=\"");
                    self.out.push_str(class);
                    self.out.push_str("\">");
                    self.open_class = Some(class);
                }
            }
            push_escaped(&mut self.out, c);
        }
    }

    fn flush_newlines(&mut self) {
        match self.pending_newlines {
            0 => return,
            1 => {
                self.close_span();
                self.out.push_str("<br>");
            }
            _ => {
                self.close_span();
                self.out.push_str("</p><p>");
            }
        }
        self.pending_newlines = 0;
    }

    fn close_span(&mut self) {
        if self.open_class.take().is_some() {
            self.out.push_str("</span>");
        }
    }

    fn finish(mut self) -> String {
        self.flush_newlines();
        self.close_span();
        format!("<p>{}</p>", self.out)
    }
}
