//! Asking the model which documents a diff affects.

use std::collections::HashSet;

use serde::Deserialize;

use docsync_core::{Diff, DocName, Document};
use docsync_llm::{parse_json_object, ChatCompleter, Message};
use docsync_prompts::PromptEngine;

use crate::error::PipelineError;

#[derive(Debug, Deserialize)]
struct FileSelection {
    files: Vec<String>,
}

/// Outcome of a selection call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Known documents to update, in the order the model listed them.
    pub files: Vec<DocName>,
    /// Names the model returned that are not among the candidates.
    pub dropped: Vec<String>,
}

/// Send the candidate documents and the diff in one chat call and return the
/// subset of candidates the model says need updating.
pub fn select(
    engine: &PromptEngine,
    completer: &dyn ChatCompleter,
    candidates: &[&Document],
    diff: &Diff,
) -> Result<Selection, PipelineError> {
    let context = engine.context(candidates)?;
    let request = engine.file_list(diff, candidates)?;
    tracing::debug!(
        "selection prompt: context {} bytes, request {} bytes",
        context.len(),
        request.len()
    );

    let messages = [Message::user(context), Message::user(request)];
    let reply = completer.complete(&messages)?;
    tracing::debug!("selection reply: {reply}");

    let parsed: FileSelection = parse_json_object(&reply)?;
    Ok(validate(parsed.files, candidates))
}

/// Keep names that match a candidate, first occurrence only.
fn validate(names: Vec<String>, candidates: &[&Document]) -> Selection {
    let known: HashSet<&str> = candidates.iter().map(|d| d.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut selection = Selection::default();

    for name in names {
        if !known.contains(name.as_str()) {
            tracing::warn!("model selected unknown document '{name}', ignoring");
            selection.dropped.push(name);
            continue;
        }
        if seen.insert(name.clone()) {
            selection.files.push(DocName::from(name));
        }
    }
    selection
}
