//! Confirm-then-persist checkpoint for proposed document revisions.
//!
//! ## Write protocol
//!
//! 1. Line-identical proposal → `Unchanged`, nothing asked, nothing written.
//! 2. Dry run → `WouldWrite`, nothing asked, nothing written.
//! 3. `confirm` policy → ask; anything but `y`/`yes` → `Declined`.
//! 4. Write to `<path>.docsync.tmp`, rename over the original.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use docsync_core::WritePolicy;

use crate::error::{io_err, PipelineError};

// ---------------------------------------------------------------------------
// Write outcome
// ---------------------------------------------------------------------------

/// What happened to one proposed revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was replaced with the proposal.
    Written,
    /// The proposal matches the current content line for line.
    Unchanged,
    /// The operator did not approve the write.
    Declined,
    /// Dry run: the file would have been written.
    WouldWrite,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteOutcome::Written => "written",
            WriteOutcome::Unchanged => "unchanged",
            WriteOutcome::Declined => "declined",
            WriteOutcome::WouldWrite => "would write",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Asks the operator a yes/no question.
pub trait Confirmer {
    fn confirm(&mut self, question: &str) -> bool;
}

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Line-oriented prompt over any reader/writer pair.
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirmer<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on stdout, read the answer from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} [y/N] ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => {
                // EOF or unreadable input: keep the prompt line tidy.
                let _ = writeln!(self.output);
                false
            }
            Ok(_) => is_affirmative(&answer),
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

pub struct WriteGate<'a> {
    policy: WritePolicy,
    dry_run: bool,
    confirmer: &'a mut dyn Confirmer,
}

impl<'a> WriteGate<'a> {
    pub fn new(policy: WritePolicy, dry_run: bool, confirmer: &'a mut dyn Confirmer) -> Self {
        Self {
            policy,
            dry_run,
            confirmer,
        }
    }

    /// Apply the write protocol for one document.
    pub fn confirm_and_write(
        &mut self,
        path: &Path,
        current: &str,
        proposed: &str,
    ) -> Result<WriteOutcome, PipelineError> {
        if current.lines().eq(proposed.lines()) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteOutcome::Unchanged);
        }

        if self.dry_run {
            tracing::info!("[dry-run] would write: {}", path.display());
            return Ok(WriteOutcome::WouldWrite);
        }

        if self.policy == WritePolicy::Confirm {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            if !self.confirmer.confirm(&format!("Apply changes to {name}?")) {
                tracing::warn!("changes to {} were not applied", path.display());
                return Ok(WriteOutcome::Declined);
            }
        }

        atomic_write(path, proposed)?;
        Ok(WriteOutcome::Written)
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Suffix of the sibling temp file used while writing a document.
pub(crate) const TMP_SUFFIX: &str = ".docsync.tmp";

/// Replace `path` with `content` via a sibling temp file and a rename.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), PipelineError> {
    let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), PipelineError> {
    let normalized = content.replace("\r\n", "\n");

    if let Err(e) = std::fs::write(tmp, &normalized) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(tmp, e));
    }
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
