//! End-of-run summary table.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use docsync_pipeline::{FileStatus, RunReport, WriteOutcome};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "document")]
    document: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn rows(report: &RunReport) -> Vec<SummaryRow> {
    report
        .files
        .iter()
        .map(|file| {
            let (outcome, detail) = match &file.status {
                FileStatus::Done(outcome) => (outcome.to_string(), String::new()),
                FileStatus::Failed(cause) => ("failed".to_string(), cause.clone()),
            };
            SummaryRow {
                document: file.name.to_string(),
                outcome,
                detail,
            }
        })
        .collect()
}

/// Render the summary as text. Empty when no document was selected.
pub fn render(report: &RunReport) -> String {
    if report.files.is_empty() {
        return String::new();
    }
    let mut table = Table::new(rows(report));
    table.with(Style::rounded());
    table.to_string()
}

pub fn print(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.no_changes {
        println!("{prefix}No code changes found. Nothing to do.");
        return;
    }
    if report.files.is_empty() {
        println!("{prefix}No documents need updating.");
        return;
    }

    println!("{}", render(report));

    let written = report.count(WriteOutcome::Written) + report.count(WriteOutcome::WouldWrite);
    let failures = report.failures();
    let line = format!(
        "{prefix}{} of {} selected documents {}",
        written,
        report.files.len(),
        if dry_run { "would be written" } else { "written" },
    );
    if failures > 0 {
        println!("{line}, {}", format!("{failures} failed").red());
    } else {
        println!("{}", line.green());
    }
}
