//! End-to-end runs against a temp repository with stubbed collaborators.

mod common;

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

use docsync_core::{ConfigError, DocName, SelectionStrategy, UpdateFormat, WritePolicy};
use docsync_llm::LlmError;
use docsync_pipeline::{launch, FileStatus, PipelineError, RunReport, WriteOutcome};

use common::*;

fn run(harness: Harness, overrides: docsync_core::Overrides) -> (Result<RunReport, PipelineError>, String) {
    let mut out = Vec::new();
    let result = launch(overrides, env_with_key, |_| harness.collaborators(), &mut out);
    (result, String::from_utf8_lossy(&out).into_owned())
}

fn statuses(report: &RunReport) -> Vec<(&str, FileStatus)> {
    report
        .files
        .iter()
        .map(|f| (f.name.as_str(), f.status.clone()))
        .collect()
}

#[test]
fn only_selected_document_is_rewritten() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md"]}"#)
        .reply("A updated\n");
    let calls = Rc::clone(&harness.calls);

    let (result, out) = run(harness, overrides(&repo));
    let report = result.unwrap();

    assert_eq!(statuses(&report), vec![("a.md", FileStatus::Done(WriteOutcome::Written))]);
    assert_eq!(report.documents, vec![DocName::from("a.md"), DocName::from("b.md")]);
    repo.child("docs/a.md").assert("A updated\n");
    repo.child("docs/b.md").assert("B");
    assert_eq!(calls.complete.get(), 2, "one selection call plus one update call");
    assert_eq!(calls.confirm.get(), 1);
    assert!(out.contains("-A"), "{out}");
    assert!(out.contains("+A updated"), "{out}");
}

#[test]
fn selection_prompt_carries_corpus_and_diff() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF).reply(r#"{"files": []}"#);
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));
    assert!(result.unwrap().files.is_empty());

    let prompts = calls.prompts.borrow();
    assert_eq!(prompts.len(), 2, "context and request messages");
    assert!(prompts[0].contains("\"a.md\": \"A\""), "{}", prompts[0]);
    assert!(prompts[0].contains("\"b.md\": \"B\""), "{}", prompts[0]);
    assert!(prompts[1].contains("+fn new_api() {}"));
}

#[test]
fn missing_api_key_stops_before_any_collaborator_runs() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF).reply(r#"{"files": ["a.md"]}"#);
    let calls = Rc::clone(&harness.calls);
    let built = Cell::new(false);

    let mut out = Vec::new();
    let err = launch(
        overrides(&repo),
        empty_env,
        |_| {
            built.set(true);
            harness.collaborators()
        },
        &mut out,
    )
    .unwrap_err();

    assert!(
        matches!(err, PipelineError::Config(ConfigError::MissingEnv("OPENAI_API_KEY"))),
        "got: {err}"
    );
    assert!(!built.get(), "collaborators must not be built");
    assert_eq!(calls.total(), 0);
    assert!(out.is_empty());
}

#[test]
fn azure_without_gateway_settings_stops_early() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF);
    let calls = Rc::clone(&harness.calls);
    let mut o = overrides(&repo);
    o.api_type = Some("azure".to_string());

    let (result, _) = run(harness, o);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_VERSION"), "{err}");
    assert_eq!(calls.total(), 0);
}

#[test]
fn empty_diff_ends_the_run_without_model_calls() {
    let repo = repo_with_two_docs();
    let harness = Harness::new("  \n");
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));
    let report = result.unwrap();

    assert!(report.no_changes);
    assert_eq!(calls.diff.get(), 1);
    assert_eq!(calls.complete.get(), 0);
}

#[test]
fn one_failed_update_does_not_stop_the_next() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md", "b.md"]}"#)
        .fail(LlmError::Status {
            status: 500,
            endpoint: "stub".to_string(),
            body: "overloaded".to_string(),
        })
        .reply("B updated\n");

    let (result, _) = run(harness, overrides(&repo));
    let report = result.unwrap();

    assert_eq!(report.failures(), 1);
    assert!(matches!(&report.files[0].status, FileStatus::Failed(msg) if msg.contains("500")));
    assert_eq!(report.files[1].status, FileStatus::Done(WriteOutcome::Written));
    repo.child("docs/a.md").assert("A");
    repo.child("docs/b.md").assert("B updated\n");
}

#[test]
fn malformed_selection_aborts_the_run() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF).reply("I would update a.md, probably.");
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));
    let err = result.unwrap_err();

    assert!(matches!(err, PipelineError::Llm(LlmError::ResponseParse { .. })), "got: {err}");
    assert_eq!(calls.complete.get(), 1);
    repo.child("docs/a.md").assert("A");
}

#[test]
fn unknown_selected_names_are_reported_and_skipped() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["ghost.md", "b.md"]}"#)
        .reply("B updated\n");

    let (result, _) = run(harness, overrides(&repo));
    let report = result.unwrap();

    assert_eq!(report.dropped, vec!["ghost.md".to_string()]);
    assert_eq!(statuses(&report), vec![("b.md", FileStatus::Done(WriteOutcome::Written))]);
}

#[rstest]
#[case::none(r#"{"files": []}"#, &[])]
#[case::all_unknown(r#"{"files": ["x.md", "docs/a.md", "A.MD"]}"#, &[])]
#[case::mixed(r#"Here you go: {"files": ["b.md", "nope.rst", "a.md"]}"#, &["b.md", "a.md"])]
#[case::duplicates(r#"{"files": ["a.md", "a.md"]}"#, &["a.md"])]
fn processed_files_are_always_known_documents(#[case] reply: &str, #[case] expected: &[&str]) {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF).reply(reply).approve(false);

    let (result, _) = run(harness, overrides(&repo));
    let report = result.unwrap();

    for file in &report.files {
        assert!(report.documents.contains(&file.name), "{} is not a document", file.name);
    }
    let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len(), "{names:?}");
    assert_eq!(names, expected);
}

#[test]
fn declined_write_leaves_document_untouched() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md"]}"#)
        .reply("A rewritten\n")
        .approve(false);
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));

    assert_eq!(
        statuses(&result.unwrap()),
        vec![("a.md", FileStatus::Done(WriteOutcome::Declined))]
    );
    assert_eq!(calls.confirm.get(), 1);
    repo.child("docs/a.md").assert("A");
}

#[test]
fn always_policy_skips_the_prompt() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md"]}"#)
        .reply("A rewritten\n")
        .approve(false);
    let calls = Rc::clone(&harness.calls);
    let mut o = overrides(&repo);
    o.write_policy = Some(WritePolicy::Always);

    let (result, _) = run(harness, o);

    assert_eq!(result.unwrap().count(WriteOutcome::Written), 1);
    assert_eq!(calls.confirm.get(), 0);
    repo.child("docs/a.md").assert("A rewritten\n");
}

#[test]
fn dry_run_shows_diff_but_writes_nothing() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["b.md"]}"#)
        .reply("B rewritten\n");
    let calls = Rc::clone(&harness.calls);
    let mut o = overrides(&repo);
    o.dry_run = true;

    let (result, out) = run(harness, o);

    assert_eq!(result.unwrap().count(WriteOutcome::WouldWrite), 1);
    assert_eq!(calls.confirm.get(), 0);
    assert!(predicate::str::contains("+B rewritten").eval(&out), "{out}");
    repo.child("docs/b.md").assert("B");
}

#[test]
fn fenced_text_reply_is_unwrapped_before_writing() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md"]}"#)
        .reply("```md\n# A\n\nnew_api replaces old_api.\n```");

    let (result, _) = run(harness, overrides(&repo));
    result.unwrap();

    repo.child("docs/a.md")
        .assert("# A\n\nnew_api replaces old_api.\n");
}

#[test]
fn echoed_fenced_document_is_unchanged() {
    let repo = repo_with_two_docs();
    let snippet = "```sh\ncargo install docsync\n```\n";
    repo.child("docs/snippet.md").write_str(snippet).unwrap();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["snippet.md"]}"#)
        .reply(snippet);
    let mut o = overrides(&repo);
    o.write_policy = Some(WritePolicy::Always);

    let (result, out) = run(harness, o);

    assert_eq!(
        statuses(&result.unwrap()),
        vec![("snippet.md", FileStatus::Done(WriteOutcome::Unchanged))]
    );
    assert!(!out.contains("-```"), "{out}");
    repo.child("docs/snippet.md").assert(snippet);
}

#[test]
fn reply_with_separate_code_blocks_is_written_verbatim() {
    let repo = repo_with_two_docs();
    let reply = "```sh\nmake\n```\n\nThen run it.\n\n```sh\n./app\n```\n";
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md"]}"#)
        .reply(reply);
    let mut o = overrides(&repo);
    o.write_policy = Some(WritePolicy::Always);

    let (result, _) = run(harness, o);
    result.unwrap();

    repo.child("docs/a.md").assert(reply);
}

#[test]
fn structured_update_for_the_wrong_file_fails_that_file() {
    let repo = repo_with_two_docs();
    let harness = Harness::new(CODE_DIFF)
        .reply(r#"{"files": ["a.md", "b.md"]}"#)
        .reply(r#"{"doc_filename": "b.md", "doc_content": "hijacked"}"#)
        .reply(r#"{"doc_filename": "b.md", "doc_content": "B structured\n"}"#);
    let calls = Rc::clone(&harness.calls);
    let mut o = overrides(&repo);
    o.update_format = Some(UpdateFormat::Structured);

    let (result, _) = run(harness, o);
    let report = result.unwrap();

    assert!(matches!(&report.files[0].status, FileStatus::Failed(msg) if msg.contains("instead of 'a.md'")));
    assert_eq!(report.files[1].status, FileStatus::Done(WriteOutcome::Written));
    assert_eq!(calls.function.get(), 2);
    repo.child("docs/a.md").assert("A");
    repo.child("docs/b.md").assert("B structured\n");
}

#[test]
fn indexed_selection_offers_only_the_nearest_documents() {
    let repo = assert_fs::TempDir::new().unwrap();
    repo.child("docs/api.md").write_str("# API\n\nThe api module.\n").unwrap();
    repo.child("docs/cli.md").write_str("# CLI\n\nThe cli flags.\n").unwrap();
    let harness = Harness::new(CODE_DIFF).reply(r#"{"files": ["cli.md"]}"#);
    let calls = Rc::clone(&harness.calls);
    let mut o = overrides(&repo);
    o.selection = Some(SelectionStrategy::Indexed);
    o.top_k = Some(1);

    let (result, _) = run(harness, o);
    let report = result.unwrap();

    assert_eq!(calls.embed.get(), 2, "corpus once, diff once");
    let prompts = calls.prompts.borrow();
    assert!(prompts[0].contains("api.md"));
    assert!(!prompts[0].contains("cli.md"), "{}", prompts[0]);
    assert_eq!(report.dropped, vec!["cli.md".to_string()]);
    assert!(report.files.is_empty());
}

#[test]
fn repository_template_overrides_the_request_prompt() {
    let repo = repo_with_two_docs();
    repo.child(".docsync/templates/filelist.tera")
        .write_str("FILES? {{ document_names | join(sep=\"|\") }}")
        .unwrap();
    let harness = Harness::new(CODE_DIFF).reply(r#"{"files": []}"#);
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));
    result.unwrap();

    assert_eq!(calls.prompts.borrow()[1], "FILES? a.md|b.md");
}

#[test]
fn leftover_temp_file_is_never_offered_to_the_model() {
    let repo = repo_with_two_docs();
    repo.child("docs/a.md.docsync.tmp").write_str("half written").unwrap();
    let harness = Harness::new(CODE_DIFF).reply(r#"{"files": ["a.md.docsync.tmp"]}"#);
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));
    let report = result.unwrap();

    assert_eq!(report.documents, vec![DocName::from("a.md"), DocName::from("b.md")]);
    assert!(!calls.prompts.borrow()[0].contains("half written"));
    assert_eq!(report.dropped, vec!["a.md.docsync.tmp".to_string()]);
    assert!(report.files.is_empty());
}

#[test]
fn missing_docs_directory_is_fatal() {
    let repo = assert_fs::TempDir::new().unwrap();
    let harness = Harness::new(CODE_DIFF);
    let calls = Rc::clone(&harness.calls);

    let (result, _) = run(harness, overrides(&repo));

    assert!(matches!(result.unwrap_err(), PipelineError::Io { .. }));
    assert_eq!(calls.complete.get(), 0);
}
