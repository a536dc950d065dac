//! Pipeline entrypoint shared by the CLI and the integration tests.
//!
//! diff → corpus → selection → (per file) update → present → gate.
//!
//! Setup, diff, corpus and selection failures abort the run. Once files are
//! selected, each one is processed independently: a failure is logged and
//! recorded in the [`RunReport`], and the next file is attempted.

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;

use docsync_core::{Config, Diff, DocName, Document, Overrides, SelectionStrategy};
use docsync_llm::{ChatCompleter, Embedder};
use docsync_prompts::PromptEngine;

use crate::diff_source::DiffSource;
use crate::error::{io_err, PipelineError};
use crate::gate::{Confirmer, WriteGate, WriteOutcome};
use crate::index::SimilarityIndex;
use crate::store::DocumentStore;
use crate::{presenter, selector, updater};

/// The external collaborators a run talks to.
pub struct Collaborators {
    pub diff_source: Box<dyn DiffSource>,
    pub completer: Box<dyn ChatCompleter>,
    pub embedder: Box<dyn Embedder>,
    pub confirmer: Box<dyn Confirmer>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Done(WriteOutcome),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: DocName,
    pub status: FileStatus,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// `true` when the diff was empty and nothing else ran.
    pub no_changes: bool,
    /// Every document found in the documentation directory.
    pub documents: Vec<DocName>,
    /// Names the model selected that do not exist.
    pub dropped: Vec<String>,
    /// One entry per selected document, in selection order.
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }

    pub fn count(&self, outcome: WriteOutcome) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Done(outcome))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline<'c> {
    config: &'c Config,
    engine: PromptEngine,
    collaborators: Collaborators,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c Config, collaborators: Collaborators) -> Result<Self, PipelineError> {
        let engine = PromptEngine::new(Some(&config.template_path()))?;
        Ok(Self {
            config,
            engine,
            collaborators,
        })
    }

    pub fn run(&mut self, out: &mut dyn Write) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        let diff = self.collaborators.diff_source.get_diff(&self.config.revisions)?;
        if diff.is_empty() {
            tracing::info!("no code changes found, nothing to do");
            report.no_changes = true;
            return Ok(report);
        }

        let store = DocumentStore::load(&self.config.docs_path())?;
        report.documents = store.names().cloned().collect();
        tracing::info!(
            "detected documents: {}",
            join_names(report.documents.iter())
        );
        if store.is_empty() {
            tracing::warn!("no documents in {}", store.dir().display());
            return Ok(report);
        }

        let candidates = self.candidates(&store, &diff)?;
        let selection = selector::select(
            &self.engine,
            self.collaborators.completer.as_ref(),
            &candidates,
            &diff,
        )?;
        report.dropped = selection.dropped;

        if selection.files.is_empty() {
            tracing::info!("no documents need updating");
            return Ok(report);
        }
        tracing::info!("files to update: {}", join_names(selection.files.iter()));

        let mut gate = WriteGate::new(
            self.config.write_policy,
            self.config.dry_run,
            self.collaborators.confirmer.as_mut(),
        );

        for name in selection.files {
            let Some(document) = store.get(name.as_str()) else {
                continue;
            };
            let status = match process(
                &self.engine,
                self.collaborators.completer.as_ref(),
                &mut gate,
                self.config,
                &diff,
                document,
                out,
            ) {
                Ok(outcome) => FileStatus::Done(outcome),
                Err(e) => {
                    tracing::error!("{name}: {e}");
                    FileStatus::Failed(e.to_string())
                }
            };
            report.files.push(FileReport { name, status });
        }

        Ok(report)
    }

    /// Documents offered to the selector under the configured strategy.
    fn candidates<'s>(
        &self,
        store: &'s DocumentStore,
        diff: &Diff,
    ) -> Result<Vec<&'s Document>, PipelineError> {
        match self.config.selection {
            SelectionStrategy::Full => Ok(store.documents().collect()),
            SelectionStrategy::Indexed => {
                let embedder = self.collaborators.embedder.as_ref();
                let index = SimilarityIndex::build(store, embedder)?;
                let nearest = index.nearest(diff, embedder, self.config.top_k)?;
                tracing::info!("nearest documents: {}", join_names(nearest.iter()));
                Ok(nearest
                    .iter()
                    .filter_map(|name| store.get(name.as_str()))
                    .collect())
            }
        }
    }
}

/// Update, show and gate a single document.
fn process(
    engine: &PromptEngine,
    completer: &dyn ChatCompleter,
    gate: &mut WriteGate<'_>,
    config: &Config,
    diff: &Diff,
    document: &Document,
    out: &mut dyn Write,
) -> Result<WriteOutcome, PipelineError> {
    tracing::info!("updating {}", document.name);
    let update = updater::update(engine, completer, diff, document, config.update_format)?;

    let lines = presenter::render(&document.content, &update.content);
    show(document, &lines, out).map_err(|e| io_err(PathBuf::from("<stdout>"), e))?;

    gate.confirm_and_write(&document.path, &document.content, &update.content)
}

fn show(
    document: &Document,
    lines: &[presenter::DisplayLine],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(out, "{}", format!("==> {}", document.name).bold())?;
    presenter::print(lines, out)?;
    out.flush()
}

fn join_names<'a>(names: impl Iterator<Item = &'a DocName>) -> String {
    names.map(DocName::as_str).collect::<Vec<_>>().join(", ")
}

/// Resolve configuration, then build collaborators and run.
///
/// `build` is only called once configuration (credentials included) is valid,
/// so a bad setup never reaches git or the network.
pub fn launch<E, B>(
    overrides: Overrides,
    env: E,
    build: B,
    out: &mut dyn Write,
) -> Result<RunReport, PipelineError>
where
    E: Fn(&str) -> Option<String>,
    B: FnOnce(&Config) -> Collaborators,
{
    let config = Config::resolve(overrides, env)?;
    tracing::debug!("resolved configuration: {config:?}");
    let collaborators = build(&config);
    Pipeline::new(&config, collaborators)?.run(out)
}
