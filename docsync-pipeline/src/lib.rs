//! # docsync-pipeline
//!
//! Diff extraction, corpus loading, model-driven selection and rewriting,
//! diff presentation and the confirm-then-write gate.
//!
//! Call [`launch`] to resolve configuration and run once, or build a
//! [`Pipeline`] directly from a resolved [`docsync_core::Config`].

pub mod diff_source;
pub mod error;
pub mod gate;
pub mod index;
pub mod pipeline;
pub mod presenter;
pub mod selector;
pub mod store;
pub mod updater;

pub use diff_source::{DiffSource, GitDiffSource};
pub use error::PipelineError;
pub use gate::{Confirmer, PromptConfirmer, WriteGate, WriteOutcome};
pub use index::SimilarityIndex;
pub use pipeline::{launch, Collaborators, FileReport, FileStatus, Pipeline, RunReport};
pub use presenter::{DisplayLine, LineKind};
pub use selector::Selection;
pub use store::DocumentStore;
