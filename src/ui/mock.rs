//! Mock sink for testing.
//!
//! `MockSink` implements [`OutputSink`] and captures every interaction for
//! later assertion. Question answers are queued up front; prompting with an
//! empty queue behaves like a missing terminal.
//!
//! # Example
//!
//! ```
//! use outpost::ui::{MockSink, OutputSink};
//!
//! let mut sink = MockSink::new();
//! sink.start_step(0, "apt_update", 3).unwrap();
//! sink.emit("Hit:1 http://deb.debian.org bookworm InRelease").unwrap();
//!
//! assert_eq!(sink.started_steps(), ["apt_update"]);
//! assert!(sink.has_line("bookworm"));
//! ```

use std::collections::VecDeque;

use crate::error::{OutpostError, Result};
use crate::steps::Attempt;

use super::OutputSink;

/// A step start captured by [`MockSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedStep {
    pub index: u64,
    pub name: String,
    pub remaining: usize,
}

/// Mock sink implementation for testing.
#[derive(Debug, Default)]
pub struct MockSink {
    interactive: bool,
    lines: Vec<String>,
    started: Vec<StartedStep>,
    finished: Vec<(String, bool)>,
    clears: usize,
    answers: VecDeque<String>,
    prompts_shown: Vec<String>,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            interactive: true,
            ..Default::default()
        }
    }

    /// Queue answers returned by successive prompts.
    pub fn queue_answers(&mut self, answers: &[&str]) {
        self.answers.extend(answers.iter().map(|a| a.to_string()));
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Every emitted line, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Check if any emitted line contains `text`.
    pub fn has_line(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l.contains(text))
    }

    /// Names of started steps, one entry per attempt.
    pub fn started_steps(&self) -> Vec<&str> {
        self.started.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn started(&self) -> &[StartedStep] {
        &self.started
    }

    /// Finished attempts as `(name, satisfied)`.
    pub fn finished(&self) -> &[(String, bool)] {
        &self.finished
    }

    /// Number of attempts of `name`.
    pub fn attempts_of(&self, name: &str) -> usize {
        self.started.iter().filter(|s| s.name == name).count()
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }
}

impl OutputSink for MockSink {
    fn start_step(&mut self, index: u64, name: &str, remaining: usize) -> Result<()> {
        self.started.push(StartedStep {
            index,
            name: name.to_string(),
            remaining,
        });
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.lines.extend(text.split('\n').map(String::from));
        Ok(())
    }

    fn finish_step(&mut self, name: &str, attempt: &Attempt) -> Result<()> {
        self.finished
            .push((name.to_string(), attempt.is_satisfied()));
        Ok(())
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        self.prompts_shown.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| OutpostError::PromptUnavailable {
                label: label.to_string(),
                reason: "no queued answer".to_string(),
            })
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
