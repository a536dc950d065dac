//! Run configuration.
//!
//! # Resolution order
//!
//! ```text
//! CLI flags (Overrides)  >  <repo>/.docsync.yaml (FileSettings)  >  defaults
//! ```
//!
//! Credentials come from the environment only. The environment is never read
//! directly: callers pass a lookup closure, so tests can supply a fixed map
//! and production passes `|key| std::env::var(key).ok()`.
//!
//! Every check in [`Config::resolve`] runs before any git or network call.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::RevRange;

pub const CONFIG_FILE_NAME: &str = ".docsync.yaml";
pub const DEFAULT_DOCS_DIR: &str = "docs";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_TOP_K: usize = 1;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_VERSION: &str = "OPENAI_API_VERSION";
pub const ENV_RESOURCE_NAME: &str = "AZURE_RESOURCE_NAME";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which chat completion service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    OpenAi,
    Azure,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::OpenAi => write!(f, "openai"),
            Backend::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Backend::OpenAi),
            "azure" => Ok(Backend::Azure),
            _ => Err(ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// What happens once an updated document has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Write without asking.
    Always,
    /// Ask the operator; anything but an explicit yes leaves the file alone.
    #[default]
    Confirm,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(WritePolicy::Always),
            "confirm" => Ok(WritePolicy::Confirm),
            other => Err(format!(
                "unknown write policy '{other}'; expected: always, confirm"
            )),
        }
    }
}

/// How candidate documents are offered to the relevance selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// Send every document's full content.
    #[default]
    Full,
    /// Send only the top-k documents nearest to the diff by embedding similarity.
    Indexed,
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Full => write!(f, "full"),
            SelectionStrategy::Indexed => write!(f, "indexed"),
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(SelectionStrategy::Full),
            "indexed" => Ok(SelectionStrategy::Indexed),
            other => Err(format!(
                "unknown selection strategy '{other}'; expected: full, indexed"
            )),
        }
    }
}

/// Response shape requested from the model when rewriting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFormat {
    /// The completion text is the new document body.
    #[default]
    Text,
    /// A forced function call whose arguments carry `doc_filename` / `doc_content`.
    Structured,
}

impl FromStr for UpdateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(UpdateFormat::Text),
            "structured" => Ok(UpdateFormat::Structured),
            other => Err(format!(
                "unknown update format '{other}'; expected: text, structured"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Extra settings required by the Azure OpenAI gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureGateway {
    pub api_version: String,
    pub resource_name: String,
}

/// Secrets and endpoints read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    /// Override for the OpenAI base URL (ignored by the Azure backend).
    pub api_base: Option<String>,
    /// Present exactly when the backend is [`Backend::Azure`].
    pub azure: Option<AzureGateway>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("azure", &self.azure)
            .finish()
    }
}

impl Credentials {
    /// Validate and collect the variables `backend` needs.
    pub fn from_env<F>(backend: Backend, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };

        let api_key = required(ENV_API_KEY)?;
        let azure = match backend {
            Backend::OpenAi => None,
            Backend::Azure => Some(AzureGateway {
                api_version: required(ENV_API_VERSION)?,
                resource_name: required(ENV_RESOURCE_NAME)?,
            }),
        };
        let api_base = env(ENV_API_BASE).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_key,
            api_base,
            azure,
        })
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Contents of `.docsync.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub docs_dir: Option<PathBuf>,
    pub api_type: Option<String>,
    pub model_name: Option<String>,
    pub selection: Option<SelectionStrategy>,
    pub top_k: Option<usize>,
    pub embedding_model: Option<String>,
    pub update_format: Option<UpdateFormat>,
    pub write_policy: Option<WritePolicy>,
    pub exclude_doc_changes: Option<bool>,
    pub template_dir: Option<PathBuf>,
}

impl FileSettings {
    /// Load settings from `path`. Missing file is an error here; see [`Self::discover`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `<repo>/.docsync.yaml` when present, defaults otherwise.
    pub fn discover(repo: &Path) -> Result<Self, ConfigError> {
        let path = repo.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Values supplied on the command line. `None` defers to the file / default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repo: PathBuf,
    pub config_path: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub api_type: Option<String>,
    pub model_name: Option<String>,
    pub selection: Option<SelectionStrategy>,
    pub top_k: Option<usize>,
    pub embedding_model: Option<String>,
    pub update_format: Option<UpdateFormat>,
    pub write_policy: Option<WritePolicy>,
    pub exclude_doc_changes: Option<bool>,
    pub template_dir: Option<PathBuf>,
    pub revisions: RevRange,
    pub debug: bool,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Fully resolved configuration, built once and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: PathBuf,
    /// Documentation directory, relative to `repo` unless absolute.
    pub docs_dir: PathBuf,
    pub backend: Backend,
    pub model: String,
    pub embedding_model: String,
    pub selection: SelectionStrategy,
    pub top_k: usize,
    pub update_format: UpdateFormat,
    pub write_policy: WritePolicy,
    pub exclude_doc_changes: bool,
    /// Prompt template overrides, relative to `repo` unless absolute.
    pub template_dir: Option<PathBuf>,
    pub revisions: RevRange,
    pub debug: bool,
    pub dry_run: bool,
    pub credentials: Credentials,
}

impl Config {
    /// Merge CLI overrides, the config file and defaults, then validate credentials.
    pub fn resolve<F>(overrides: Overrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match &overrides.config_path {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::discover(&overrides.repo)?,
        };

        let backend = match (overrides.api_type.as_deref(), file.api_type.as_deref()) {
            (Some(raw), _) => raw.parse::<Backend>()?,
            (None, Some(raw)) => raw.parse::<Backend>().map_err(|e| ConfigError::FileValue {
                path: overrides
                    .config_path
                    .clone()
                    .unwrap_or_else(|| overrides.repo.join(CONFIG_FILE_NAME)),
                source: Box::new(e),
            })?,
            (None, None) => Backend::default(),
        };

        let top_k = overrides.top_k.or(file.top_k).unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(ConfigError::Invalid {
                option: "top_k",
                reason: "must be at least 1".to_string(),
            });
        }

        let model = overrides
            .model_name
            .or(file.model_name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                option: "model_name",
                reason: "must not be empty".to_string(),
            });
        }

        let credentials = Credentials::from_env(backend, env)?;

        Ok(Self {
            docs_dir: overrides
                .docs_dir
                .or(file.docs_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR)),
            backend,
            model,
            embedding_model: overrides
                .embedding_model
                .or(file.embedding_model)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            selection: overrides.selection.or(file.selection).unwrap_or_default(),
            top_k,
            update_format: overrides
                .update_format
                .or(file.update_format)
                .unwrap_or_default(),
            write_policy: overrides
                .write_policy
                .or(file.write_policy)
                .unwrap_or_default(),
            exclude_doc_changes: overrides
                .exclude_doc_changes
                .or(file.exclude_doc_changes)
                .unwrap_or(true),
            template_dir: overrides.template_dir.or(file.template_dir),
            revisions: overrides.revisions,
            debug: overrides.debug,
            dry_run: overrides.dry_run,
            repo: overrides.repo,
            credentials,
        })
    }

    /// `<repo>/<docs_dir>`
    pub fn docs_path(&self) -> PathBuf {
        self.repo.join(&self.docs_dir)
    }

    /// Template override directory: the configured one, else `<repo>/.docsync/templates`.
    pub fn template_path(&self) -> PathBuf {
        match &self.template_dir {
            Some(dir) => self.repo.join(dir),
            None => self.repo.join(".docsync").join("templates"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
