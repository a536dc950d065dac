//! Error types for docsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building a [`crate::Config`].
///
/// All variants are fatal: they are raised before any git or network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("{0} is not set")]
    MissingEnv(&'static str),

    /// `--api-type` / `api_type` named something other than `openai` or `azure`.
    #[error("API type '{0}' is not supported. Select from 'openai' or 'azure'.")]
    UnsupportedBackend(String),

    /// An option value was syntactically fine but out of range.
    #[error("invalid value for {option}: {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    FileNotFound { path: PathBuf },

    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value read from the config file was rejected.
    #[error("invalid setting in config file {path}: {source}")]
    FileValue {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },

    /// YAML parse error on load, with the file path and serde_yaml line context.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
