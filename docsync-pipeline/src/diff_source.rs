//! Producing the code diff that drives a run.

use std::path::PathBuf;
use std::process::Command;

use docsync_core::{Diff, RevRange};

use crate::error::PipelineError;

/// Pathspec that keeps documentation edits out of the diff.
pub const DOC_EXCLUDE_PATHSPEC: &[&str] = &["--", ".", ":(exclude)*.md", ":(exclude)*.rst"];

/// Anything that can hand the pipeline a unified diff.
pub trait DiffSource {
    fn get_diff(&self, revisions: &RevRange) -> Result<Diff, PipelineError>;
}

/// `git diff` run inside a repository.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    repo: PathBuf,
    exclude_docs: bool,
}

impl GitDiffSource {
    pub fn new(repo: impl Into<PathBuf>, exclude_docs: bool) -> Self {
        Self {
            repo: repo.into(),
            exclude_docs,
        }
    }

    /// Arguments passed to `git`, revision range included.
    pub fn args<'a>(&self, revisions: &'a RevRange) -> Vec<&'a str> {
        let mut args = vec!["diff"];
        args.extend(revisions.args());
        if self.exclude_docs {
            args.extend_from_slice(DOC_EXCLUDE_PATHSPEC);
        }
        args
    }
}

impl DiffSource for GitDiffSource {
    fn get_diff(&self, revisions: &RevRange) -> Result<Diff, PipelineError> {
        let args = self.args(revisions);
        tracing::debug!("running git {} in {}", args.join(" "), self.repo.display());

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.repo)
            .output()
            .map_err(|e| PipelineError::ExternalTool {
                tool: "git",
                message: format!("could not run git in {}: {e}", self.repo.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ExternalTool {
                tool: "git",
                message: format!("git diff exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        let diff = Diff::new(text);
        tracing::debug!("diff has {} lines", diff.line_count());
        Ok(diff)
    }
}
