//! Chat-completions and embeddings JSON bodies, shared by both backends.

use serde::{Deserialize, Serialize};

use crate::error::{parse_err, LlmError};
use crate::message::{FunctionSpec, Message};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    /// Omitted for Azure, where the deployment in the URL picks the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: &'a [Message],
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDef<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice<'a>>,
}

impl<'a> ChatRequest<'a> {
    pub fn text(model: Option<&'a str>, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            temperature: 0.0,
            tools: None,
            tool_choice: None,
        }
    }

    pub fn forced_function(
        model: Option<&'a str>,
        messages: &'a [Message],
        function: &'a FunctionSpec,
    ) -> Self {
        Self {
            tools: Some(vec![ToolDef {
                kind: "function",
                function,
            }]),
            tool_choice: Some(ToolChoice {
                kind: "function",
                function: ToolChoiceName {
                    name: &function.name,
                },
            }),
            ..Self::text(model, messages)
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ToolDef<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: &'a FunctionSpec,
}

#[derive(Debug, Serialize)]
pub(crate) struct ToolChoice<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolChoiceName<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ToolChoiceName<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub input: &'a [String],
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Legacy single-call field still returned by older API versions.
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    pub data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingItem {
    pub index: usize,
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Text of the first choice.
pub(crate) fn first_text(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| parse_err(format!("invalid chat response body: {e}"), body))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| parse_err("response has no choices", body))?;
    choice
        .message
        .content
        .ok_or_else(|| parse_err("first choice has no text content", body))
}

/// Raw arguments of the first call to `name` in the first choice.
pub(crate) fn function_arguments(body: &str, name: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| parse_err(format!("invalid chat response body: {e}"), body))?;
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| parse_err("response has no choices", body))?
        .message;

    let calls = message
        .tool_calls
        .into_iter()
        .map(|call| call.function)
        .chain(message.function_call);
    for call in calls {
        if call.name == name {
            return Ok(call.arguments);
        }
    }
    Err(parse_err(format!("response does not call `{name}`"), body))
}

/// Embedding vectors ordered by input index.
pub(crate) fn embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, LlmError> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| parse_err(format!("invalid embeddings body: {e}"), body))?;
    if response.data.len() != expected {
        return Err(parse_err(
            format!(
                "expected {expected} embeddings, got {}",
                response.data.len()
            ),
            body,
        ));
    }
    response.data.sort_by_key(|item| item.index);
    Ok(response.data.into_iter().map(|item| item.embedding).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
