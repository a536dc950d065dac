//! Wire real collaborators into the pipeline and report the outcome.

use anyhow::{Context, Result};

use docsync_core::Config;
use docsync_llm::clients_for;
use docsync_pipeline::{launch, Collaborators, GitDiffSource, PromptConfirmer};

use crate::summary;
use crate::Cli;

/// Production collaborators for a resolved configuration.
fn collaborators(config: &Config) -> Collaborators {
    let clients = clients_for(config);
    tracing::debug!("using {} backend, model {}", clients.completer.backend(), config.model);
    Collaborators {
        diff_source: Box::new(GitDiffSource::new(&config.repo, config.exclude_doc_changes)),
        completer: clients.completer,
        embedder: clients.embedder,
        confirmer: Box::new(PromptConfirmer::stdio()),
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    let report = launch(
        cli.overrides(),
        |key| std::env::var(key).ok(),
        collaborators,
        &mut stdout,
    )
    .with_context(|| format!("docsync failed for '{}'", cli.repo.display()))?;

    summary::print(&report, cli.dry_run);
    Ok(())
}
