//! Tera prompt engine: [`PromptKind`] and [`PromptEngine`].
//!
//! # Templates
//!
//! | Kind             | Template                 | Sent by             |
//! |------------------|--------------------------|---------------------|
//! | Context          | `context.tera`           | relevance selector  |
//! | FileList         | `filelist.tera`          | relevance selector  |
//! | Update           | `update.tera`            | document updater    |
//! | UpdateStructured | `update_structured.tera` | document updater    |
//!
//! A `.tera` file with the same name in the user template directory replaces
//! the embedded default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use docsync_core::{Diff, Document, UpdateFormat};

use crate::context::{CorpusCtx, FileListCtx, UpdateCtx};
use crate::error::PromptError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("context.tera", include_str!("templates/context.tera")),
    ("filelist.tera", include_str!("templates/filelist.tera")),
    ("update.tera", include_str!("templates/update.tera")),
    (
        "update_structured.tera",
        include_str!("templates/update_structured.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PromptError {
    PromptError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, PromptError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut templates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if !meta.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, PromptError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            tracing::debug!("prompt template override: {name}");
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// PromptKind
// ---------------------------------------------------------------------------

/// Every prompt docsync sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Context,
    FileList,
    Update,
    UpdateStructured,
}

impl PromptKind {
    /// All prompt kinds in a stable order.
    pub fn all() -> &'static [PromptKind] {
        &[
            PromptKind::Context,
            PromptKind::FileList,
            PromptKind::Update,
            PromptKind::UpdateStructured,
        ]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            PromptKind::Context          => "context.tera",
            PromptKind::FileList         => "filelist.tera",
            PromptKind::Update           => "update.tera",
            PromptKind::UpdateStructured => "update_structured.tera",
        }
    }
}

// ---------------------------------------------------------------------------
// PromptEngine
// ---------------------------------------------------------------------------

/// Renders prompt text from embedded templates plus optional overrides.
///
/// Create once per run and reuse for every call.
pub struct PromptEngine {
    tera: Tera,
}

impl PromptEngine {
    /// Construct a [`PromptEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, PromptError> {
        let tera = build_tera(user_template_dir)?;
        Ok(PromptEngine { tera })
    }

    /// Construct a [`PromptEngine`] with embedded templates only.
    pub fn embedded() -> Result<Self, PromptError> {
        Self::new(None)
    }

    /// The "here is the documentation" message for the relevance selector.
    pub fn context(&self, documents: &[&Document]) -> Result<String, PromptError> {
        let ctx = CorpusCtx::from_documents(documents)?;
        self.render(PromptKind::Context, &ctx)
    }

    /// The "which files need updating" request for the relevance selector.
    pub fn file_list(&self, diff: &Diff, documents: &[&Document]) -> Result<String, PromptError> {
        self.render(PromptKind::FileList, &FileListCtx::new(diff, documents))
    }

    /// The rewrite request for a single document.
    pub fn update(
        &self,
        diff: &Diff,
        document: &Document,
        format: UpdateFormat,
    ) -> Result<String, PromptError> {
        let kind = match format {
            UpdateFormat::Text => PromptKind::Update,
            UpdateFormat::Structured => PromptKind::UpdateStructured,
        };
        self.render(kind, &UpdateCtx::new(diff, document))
    }

    fn render<T: serde::Serialize>(&self, kind: PromptKind, ctx: &T) -> Result<String, PromptError> {
        let tera_ctx = tera::Context::from_serialize(ctx)?;
        let rendered = self.tera.render(kind.template_name(), &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
