//! Domain types for a docsync run.
//!
//! A run is stateless: every value here is built from the working tree at
//! startup and dropped when the process exits.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// File name of a document, unique within the documentation directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocName(pub String);

impl DocName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Unified diff text produced once per run. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff(String);

impl Diff {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the diff carries no change at all (whitespace only).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Number of lines in the diff text.
    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Revision range handed to `git diff`. Both ends empty means "working tree".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RevRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    /// Revision arguments in the order git expects them.
    pub fn args(&self) -> Vec<&str> {
        self.from
            .iter()
            .chain(self.to.iter())
            .map(String::as_str)
            .collect()
    }
}

/// A documentation file loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: DocName,
    /// Absolute or repo-relative path the content was read from.
    pub path: PathBuf,
    pub content: String,
    pub title: Option<String>,
}

impl Document {
    /// Build a document, deriving `title` from the content.
    pub fn new(name: impl Into<DocName>, path: impl Into<PathBuf>, content: String) -> Self {
        let title = extract_title(&content);
        Self {
            name: name.into(),
            path: path.into(),
            content,
            title,
        }
    }
}

/// Replacement content proposed for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub name: DocName,
    pub content: String,
}

/// First Markdown ATX heading, or first reStructuredText underlined title.
pub fn extract_title(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            let heading = rest.trim_start_matches('#').trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
            continue;
        }
        if let Some(next) = lines.get(idx + 1) {
            if is_rst_underline(next.trim(), trimmed) {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn is_rst_underline(candidate: &str, title: &str) -> bool {
    let Some(first) = candidate.chars().next() else {
        return false;
    };
    matches!(first, '=' | '-' | '~' | '^' | '*' | '+')
        && candidate.chars().all(|c| c == first)
        && candidate.chars().count() >= title.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
