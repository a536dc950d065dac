//! # docsync-llm
//!
//! The language-model boundary: a [`ChatCompleter`] capability with one
//! implementation per backend, an [`Embedder`] for similarity selection, and
//! helpers that pull structured data out of free-form model replies.
//!
//! Backends are picked once at startup with [`clients_for`]; nothing past that
//! point branches on the backend.

pub mod completer;
pub mod error;
pub mod http;
pub mod message;
pub mod response;
mod wire;

pub use completer::{clients_for, ChatCompleter, Clients, Embedder};
pub use error::LlmError;
pub use http::{AzureClient, OpenAiClient};
pub use message::{FunctionSpec, Message, Role};
pub use response::{extract_json_object, parse_json_object, strip_code_fence};
