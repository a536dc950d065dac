//! # docsync-prompts
//!
//! Tera-based prompt builder for the relevance selector and the document
//! updater.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docsync_core::{Diff, Document, UpdateFormat};
//! use docsync_prompts::PromptEngine;
//!
//! fn build(doc: &Document, diff: &Diff) {
//!     if let Ok(engine) = PromptEngine::embedded() {
//!         if let Ok(prompt) = engine.update(diff, doc, UpdateFormat::Text) {
//!             println!("{} bytes", prompt.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{CorpusCtx, FileListCtx, UpdateCtx};
pub use engine::{PromptEngine, PromptKind};
pub use error::PromptError;
