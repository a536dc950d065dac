//! Unified diff between a document and its proposed revision.

use std::io::Write;

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

pub const OLD_HEADER: &str = "Current Document";
pub const NEW_HEADER: &str = "Updated Document";
const CONTEXT_RADIUS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Hunk,
    Addition,
    Removal,
    Context,
}

/// One printable line of a unified diff, prefix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
}

impl DisplayLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Line diff of `current` against `proposed`. Identical inputs yield no lines.
pub fn render(current: &str, proposed: &str) -> Vec<DisplayLine> {
    let old: Vec<&str> = current.lines().collect();
    let new: Vec<&str> = proposed.lines().collect();
    let diff = TextDiff::from_slices(&old[..], &new[..]);
    let mut unified = diff.unified_diff();
    unified.context_radius(CONTEXT_RADIUS);

    let mut lines = Vec::new();
    for hunk in unified.iter_hunks() {
        if lines.is_empty() {
            lines.push(DisplayLine::new(LineKind::Header, format!("--- {OLD_HEADER}")));
            lines.push(DisplayLine::new(LineKind::Header, format!("+++ {NEW_HEADER}")));
        }
        lines.push(DisplayLine::new(LineKind::Hunk, hunk.header().to_string()));
        for change in hunk.iter_changes() {
            let (kind, sign) = match change.tag() {
                ChangeTag::Insert => (LineKind::Addition, '+'),
                ChangeTag::Delete => (LineKind::Removal, '-'),
                ChangeTag::Equal => (LineKind::Context, ' '),
            };
            lines.push(DisplayLine::new(kind, format!("{sign}{}", change.value())));
        }
    }
    lines
}

/// Print `lines`, additions green and removals red.
pub fn print(lines: &[DisplayLine], out: &mut dyn Write) -> std::io::Result<()> {
    for line in lines {
        match line.kind {
            LineKind::Addition => writeln!(out, "{}", line.text.green())?,
            LineKind::Removal => writeln!(out, "{}", line.text.red())?,
            _ => writeln!(out, "{}", line.text)?,
        }
    }
    Ok(())
}
