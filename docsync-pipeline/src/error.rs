//! Error types for docsync-pipeline.

use std::path::PathBuf;

use thiserror::Error;

use docsync_core::ConfigError;
use docsync_llm::LlmError;
use docsync_prompts::PromptError;

/// All errors that can arise from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external command could not be spawned or exited non-zero.
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: &'static str, message: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A call across the model boundary failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A prompt template failed to render.
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),
}

/// Convenience constructor for [`PipelineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.into(),
        source,
    }
}
