//! Asking the model for a revised document body.

use serde::Deserialize;
use serde_json::json;

use docsync_core::{Diff, Document, UpdateFormat, UpdateResult};
use docsync_llm::error::parse_err;
use docsync_llm::{strip_code_fence, ChatCompleter, FunctionSpec, Message};
use docsync_prompts::PromptEngine;

use crate::error::PipelineError;

pub const UPDATE_FUNCTION: &str = "update_document";

/// Arguments of the `update_document` function call.
#[derive(Debug, Deserialize)]
struct UpdateArgs {
    doc_filename: String,
    doc_content: String,
}

/// Schema for the forced `update_document(doc_filename, doc_content)` call.
pub fn update_function() -> FunctionSpec {
    FunctionSpec {
        name: UPDATE_FUNCTION.to_string(),
        description: "Replace the full content of a documentation file.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "doc_filename": {
                    "type": "string",
                    "description": "File name of the document being updated."
                },
                "doc_content": {
                    "type": "string",
                    "description": "The complete revised document."
                }
            },
            "required": ["doc_filename", "doc_content"]
        }),
    }
}

/// Request a rewrite of `document` that reflects `diff`.
pub fn update(
    engine: &PromptEngine,
    completer: &dyn ChatCompleter,
    diff: &Diff,
    document: &Document,
    format: UpdateFormat,
) -> Result<UpdateResult, PipelineError> {
    let prompt = engine.update(diff, document, format)?;
    tracing::debug!("update prompt for {}: {} bytes", document.name, prompt.len());
    let messages = [Message::user(prompt)];

    let content = match format {
        UpdateFormat::Text => {
            let reply = completer.complete(&messages)?;
            unwrap_reply(&reply, &document.content).to_string()
        }
        UpdateFormat::Structured => {
            let raw = completer.complete_with_function(&messages, &update_function())?;
            structured_content(&raw, document.name.as_str())?
        }
    };

    Ok(UpdateResult {
        name: document.name.clone(),
        content,
    })
}

/// Strip a fence the model wrapped around the reply, but never one that is
/// part of the document itself.
fn unwrap_reply<'a>(reply: &'a str, current: &str) -> &'a str {
    if current.trim_start().starts_with("```") {
        return reply;
    }
    strip_code_fence(reply)
}

/// Decode function-call arguments and check they are for `expected`.
fn structured_content(raw: &str, expected: &str) -> Result<String, PipelineError> {
    let args: UpdateArgs = serde_json::from_str(raw)
        .map_err(|e| parse_err(format!("invalid {UPDATE_FUNCTION} arguments: {e}"), raw))?;
    if args.doc_filename != expected {
        return Err(parse_err(
            format!(
                "{UPDATE_FUNCTION} was called for '{}' instead of '{expected}'",
                args.doc_filename
            ),
            raw,
        )
        .into());
    }
    Ok(args.doc_content)
}
