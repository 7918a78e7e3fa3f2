//! Non-interactive sink for headless runs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{OutpostError, Result};
use crate::steps::Attempt;

use super::{sanitize, OutputMode, OutputSink, StepLog};

/// Prefix of environment variables that pre-answer question steps.
pub const ANSWER_ENV_PREFIX: &str = "OUTPOST_ANSWER_";

/// Sink that writes plain lines to stdout.
///
/// Questions are answered from `OUTPOST_ANSWER_<STEP>` environment variables
/// (step name upper-cased, other characters replaced by `_`); a question
/// without one is an error.
pub struct NonInteractiveSink {
    mode: OutputMode,
    log: StepLog,
    answers: HashMap<String, String>,
    current: Option<String>,
}

impl NonInteractiveSink {
    /// Create a sink, collecting `OUTPOST_ANSWER_*` from the environment.
    pub fn new(mode: OutputMode, log_dir: impl Into<PathBuf>) -> Self {
        let answers = std::env::vars()
            .filter(|(k, _)| k.starts_with(ANSWER_ENV_PREFIX))
            .collect();
        Self::with_answers(mode, log_dir, answers)
    }

    /// Create with explicit answers (for testing).
    pub fn with_answers(
        mode: OutputMode,
        log_dir: impl Into<PathBuf>,
        answers: HashMap<String, String>,
    ) -> Self {
        Self {
            mode,
            log: StepLog::new(log_dir),
            answers,
            current: None,
        }
    }

    /// Environment variable consulted for the question step `name`.
    pub fn answer_key(name: &str) -> String {
        let suffix: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", ANSWER_ENV_PREFIX, suffix)
    }

    /// Whether the question step `name` has a pre-supplied answer.
    pub fn has_answer(&self, name: &str) -> bool {
        self.answers.contains_key(&Self::answer_key(name))
    }
}

impl OutputSink for NonInteractiveSink {
    fn start_step(&mut self, index: u64, name: &str, remaining: usize) -> Result<()> {
        self.log.open(index, name)?;
        self.current = Some(name.to_string());
        println!("==> [{:06}] {} ({} remaining)", index, name, remaining);
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.log.write(text)?;
        if self.mode.shows_command_output() {
            for line in text.split('\n') {
                println!("    {}", sanitize(line));
            }
        }
        Ok(())
    }

    fn finish_step(&mut self, name: &str, attempt: &Attempt) -> Result<()> {
        let line = match attempt {
            Attempt::Done(outcome) if outcome.is_satisfied() => format!("✓ {} ({})", name, outcome),
            Attempt::Done(_) => format!("⚠ {} (empty, dependents stay pending)", name),
            Attempt::Failed => format!("✗ {} failed, will retry", name),
        };
        self.log.write(&line)?;
        self.log.close()?;
        self.current = None;
        println!("{}", line);
        Ok(())
    }

    fn clear(&mut self) {}

    fn prompt(&mut self, label: &str) -> Result<String> {
        let name = self.current.clone().unwrap_or_default();
        let answer = self
            .answers
            .get(&Self::answer_key(&name))
            .cloned()
            .ok_or_else(|| OutpostError::PromptUnavailable {
                label: label.to_string(),
                reason: self.answer_hint(&name),
            })?;

        self.log.write(&format!("{}: {}", label, answer))?;
        println!("    {}: {}", label, answer);
        Ok(answer)
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("⚠ {}", msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn can_answer(&self, step: &str) -> bool {
        self.has_answer(step)
    }

    fn answer_hint(&self, step: &str) -> String {
        format!("set {} to answer it", Self::answer_key(step))
    }
}
