//! Prompt contexts: serializable payloads handed to the templates.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use docsync_core::{Diff, Document};

use crate::error::PromptError;

/// Payload for `context.tera`: the whole candidate corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusCtx {
    /// JSON object of file name → content.
    pub documents_json: String,
    pub document_names: Vec<String>,
}

impl CorpusCtx {
    pub fn from_documents(documents: &[&Document]) -> Result<Self, PromptError> {
        let corpus: BTreeMap<&str, &str> = documents
            .iter()
            .map(|doc| (doc.name.as_str(), doc.content.as_str()))
            .collect();
        Ok(CorpusCtx {
            documents_json: serde_json::to_string_pretty(&corpus)?,
            document_names: corpus.keys().map(|name| name.to_string()).collect(),
        })
    }
}

/// Payload for `filelist.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct FileListCtx {
    pub diff: String,
    pub document_names: Vec<String>,
}

impl FileListCtx {
    pub fn new(diff: &Diff, documents: &[&Document]) -> Self {
        let mut document_names: Vec<String> =
            documents.iter().map(|doc| doc.name.to_string()).collect();
        document_names.sort();
        FileListCtx {
            diff: diff.as_str().to_string(),
            document_names,
        }
    }
}

/// Payload for `update.tera` and `update_structured.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCtx {
    pub diff: String,
    pub filename: String,
    pub title: Option<String>,
    pub content: String,
    /// Info string for the code fence around the current content.
    pub fence_lang: String,
}

impl UpdateCtx {
    pub fn new(diff: &Diff, document: &Document) -> Self {
        UpdateCtx {
            diff: diff.as_str().to_string(),
            filename: document.name.to_string(),
            title: document.title.clone(),
            content: document.content.clone(),
            fence_lang: fence_lang(document.name.as_str()).to_string(),
        }
    }
}

fn fence_lang(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("rst") => "rst",
        Some("txt") => "text",
        Some("adoc") => "asciidoc",
        _ => "md",
    }
}
