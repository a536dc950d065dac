//! Pulling structured data out of free-form model replies.
//!
//! Models often wrap the JSON they were asked for in prose or a code fence.
//! [`extract_json_object`] scans for the first balanced `{...}` span that
//! parses as JSON, skipping braces inside string literals.

use serde::de::DeserializeOwned;

use crate::error::{parse_err, LlmError};

/// Return the end index (exclusive) of the balanced object starting at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Locate the first JSON object embedded in `text`.
///
/// Each `{` is tried as a candidate start in turn; the first balanced span
/// that is valid JSON wins. Returns `None` when no candidate parses.
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|&(_, ch)| ch == '{')
        .filter_map(|(start, _)| balanced_end(text, start).map(|end| &text[start..end]))
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
}

/// Extract the first JSON object from `text` and deserialize it as `T`.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let object = extract_json_object(text)
        .ok_or_else(|| parse_err("no JSON object found in model reply", text))?;
    serde_json::from_str(object)
        .map_err(|e| parse_err(format!("unexpected JSON shape: {e}"), text))
}

/// Strip one enclosing Markdown code fence, if the whole reply is fenced.
///
/// "```md\n# Title\n```" becomes "# Title\n". Replies that merely contain a
/// fence somewhere inside are returned unchanged, and so are replies whose
/// interior holds another fence line: those are several blocks, not one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("md", "rst", ...) on the opening line.
    let Some(newline) = body.find('\n') else {
        return text;
    };
    let inner = &body[newline + 1..];
    if inner.lines().any(|line| line.trim_start().starts_with("```")) {
        return text;
    }
    inner
}
