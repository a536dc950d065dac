//! docsync: keep documentation in step with code changes.
//!
//! # Usage
//!
//! ```text
//! docsync [--repo <path>] [--docs-dir <dir>] [--api-type openai|azure] [--model-name <id>]
//!         [--from <rev>] [--to <rev>] [--selection full|indexed] [--top-k <n>]
//!         [--update-format text|structured] [--include-doc-changes]
//!         [--config <file>] [--yes] [--dry-run] [--debug] [--no-color]
//! ```

mod run;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use docsync_core::{
    Overrides, RevRange, SelectionStrategy, UpdateFormat, WritePolicy,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "docsync",
    version,
    about = "Update project documentation to match the current code diff",
    long_about = None,
)]
pub struct Cli {
    /// Repository to inspect.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Documentation directory, relative to the repository [default: docs].
    #[arg(long)]
    pub docs_dir: Option<PathBuf>,

    /// Model backend: openai or azure [default: openai].
    #[arg(long)]
    pub api_type: Option<String>,

    /// Model (or Azure deployment) name [default: gpt-3.5-turbo].
    #[arg(long)]
    pub model_name: Option<String>,

    /// Diff from this revision.
    #[arg(long)]
    pub from: Option<String>,

    /// Diff up to this revision.
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// How candidate documents are chosen: full or indexed [default: full].
    #[arg(long)]
    pub selection: Option<SelectionStrategy>,

    /// Number of nearest documents offered with `--selection indexed` [default: 1].
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Shape of the rewrite reply: text or structured [default: text].
    #[arg(long)]
    pub update_format: Option<UpdateFormat>,

    /// Feed changes to .md/.rst files into the diff as well.
    #[arg(long)]
    pub include_doc_changes: bool,

    /// Config file [default: <repo>/.docsync.yaml].
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write every update without asking.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show proposed changes without writing or asking.
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose logging, including prompts and replies.
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Flags that feed configuration resolution. Unset flags stay `None`.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repo: self.repo.clone(),
            config_path: self.config.clone(),
            docs_dir: self.docs_dir.clone(),
            api_type: self.api_type.clone(),
            model_name: self.model_name.clone(),
            selection: self.selection,
            top_k: self.top_k,
            embedding_model: None,
            update_format: self.update_format,
            write_policy: self.yes.then_some(WritePolicy::Always),
            exclude_doc_changes: self.include_doc_changes.then_some(false),
            template_dir: None,
            revisions: RevRange::new(self.from.clone(), self.to.clone()),
            debug: self.debug,
            dry_run: self.dry_run,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    if cli.no_color {
        colored::control::set_override(false);
    }
    run::run(&cli)
}
