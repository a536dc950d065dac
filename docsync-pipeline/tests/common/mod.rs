//! Stub collaborators that record every call they receive.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use docsync_core::{Diff, Overrides, RevRange};
use docsync_llm::{ChatCompleter, Embedder, FunctionSpec, LlmError, Message};
use docsync_pipeline::{Collaborators, Confirmer, DiffSource, PipelineError};

#[derive(Default)]
pub struct Calls {
    pub diff: Cell<usize>,
    pub complete: Cell<usize>,
    pub function: Cell<usize>,
    pub embed: Cell<usize>,
    pub confirm: Cell<usize>,
    /// Every message sent to the completer, in order.
    pub prompts: RefCell<Vec<String>>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.diff.get() + self.complete.get() + self.function.get() + self.embed.get()
    }
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

pub struct StubDiff {
    text: String,
    calls: Rc<Calls>,
}

impl DiffSource for StubDiff {
    fn get_diff(&self, _revisions: &RevRange) -> Result<Diff, PipelineError> {
        bump(&self.calls.diff);
        Ok(Diff::new(self.text.clone()))
    }
}

/// Replies are consumed in order by both `complete` and `complete_with_function`.
pub struct ScriptedCompleter {
    replies: RefCell<VecDeque<Result<String, LlmError>>>,
    calls: Rc<Calls>,
}

impl ScriptedCompleter {
    fn next(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls
            .prompts
            .borrow_mut()
            .extend(messages.iter().map(|m| m.content.clone()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

impl ChatCompleter for ScriptedCompleter {
    fn backend(&self) -> &str {
        "scripted"
    }

    fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        bump(&self.calls.complete);
        self.next(messages)
    }

    fn complete_with_function(
        &self,
        messages: &[Message],
        _function: &FunctionSpec,
    ) -> Result<String, LlmError> {
        bump(&self.calls.function);
        self.next(messages)
    }
}

/// Two-dimensional embedding: occurrences of "api" and of "cli".
pub struct KeywordEmbedder {
    calls: Rc<Calls>,
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        bump(&self.calls.embed);
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                vec![t.matches("api").count() as f32, t.matches("cli").count() as f32]
            })
            .collect())
    }
}

pub struct FixedAnswer {
    answer: bool,
    calls: Rc<Calls>,
}

impl Confirmer for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> bool {
        bump(&self.calls.confirm);
        self.answer
    }
}

/// Builder for a stubbed run.
pub struct Harness {
    pub calls: Rc<Calls>,
    pub diff: String,
    pub replies: Vec<Result<String, LlmError>>,
    pub approve: bool,
}

impl Harness {
    pub fn new(diff: &str) -> Self {
        Self {
            calls: Rc::new(Calls::default()),
            diff: diff.to_string(),
            replies: vec![],
            approve: true,
        }
    }

    pub fn reply(mut self, text: &str) -> Self {
        self.replies.push(Ok(text.to_string()));
        self
    }

    pub fn fail(mut self, err: LlmError) -> Self {
        self.replies.push(Err(err));
        self
    }

    pub fn approve(mut self, approve: bool) -> Self {
        self.approve = approve;
        self
    }

    pub fn collaborators(self) -> Collaborators {
        Collaborators {
            diff_source: Box::new(StubDiff {
                text: self.diff,
                calls: Rc::clone(&self.calls),
            }),
            completer: Box::new(ScriptedCompleter {
                replies: RefCell::new(self.replies.into()),
                calls: Rc::clone(&self.calls),
            }),
            embedder: Box::new(KeywordEmbedder {
                calls: Rc::clone(&self.calls),
            }),
            confirmer: Box::new(FixedAnswer {
                answer: self.approve,
                calls: Rc::clone(&self.calls),
            }),
        }
    }
}

pub const CODE_DIFF: &str = "diff --git a/src/api.rs b/src/api.rs\n-fn old_api() {}\n+fn new_api() {}\n";

/// Repository with `docs/a.md` = "A" and `docs/b.md` = "B".
pub fn repo_with_two_docs() -> TempDir {
    let repo = TempDir::new().unwrap();
    repo.child("docs/a.md").write_str("A").unwrap();
    repo.child("docs/b.md").write_str("B").unwrap();
    repo
}

pub fn overrides(repo: &TempDir) -> Overrides {
    Overrides {
        repo: repo.path().to_path_buf(),
        ..Overrides::default()
    }
}

pub fn env_with_key(key: &str) -> Option<String> {
    (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
}

pub fn empty_env(_key: &str) -> Option<String> {
    None
}
