//! Error types for docsync-llm.

use thiserror::Error;

/// All errors that can arise from a call across the model boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The reply arrived but was not in the expected shape.
    #[error("could not parse model response: {reason} (response began: {excerpt:?})")]
    ResponseParse { reason: String, excerpt: String },

    /// The completer cannot serve this kind of request.
    #[error("{backend} backend does not support {feature}")]
    Unsupported {
        backend: String,
        feature: &'static str,
    },
}

/// Convenience constructor for [`LlmError::ResponseParse`].
pub fn parse_err(reason: impl Into<String>, raw: &str) -> LlmError {
    LlmError::ResponseParse {
        reason: reason.into(),
        excerpt: excerpt(raw, 200),
    }
}

/// First `max_chars` characters of `raw`, never splitting a code point.
pub(crate) fn excerpt(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}
