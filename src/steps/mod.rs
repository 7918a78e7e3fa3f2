//! Steps: the retryable units of work the runner schedules.
//!
//! - [`Step`] - The contract every step implements
//! - [`StepCore`] - Identity, predecessor and attempt bookkeeping shared by all variants
//! - [`Outcome`] / [`Attempt`] - What a run produced
//! - Variants: [`CommandStep`], [`QuestionStep`], [`RegexEdit`], [`BulkRegexEdit`],
//!   [`FileAppend`], [`CopyFile`]
//!
//! # Example
//!
//! ```no_run
//! use outpost::steps::{Attempt, CommandStep, Step};
//! use outpost::ui::MockSink;
//!
//! let mut step = CommandStep::new("hello", "echo hello").with_max_attempts(3);
//! let mut sink = MockSink::new();
//!
//! match step.run(&mut sink).unwrap() {
//!     Attempt::Done(outcome) => println!("done: {}", outcome),
//!     Attempt::Failed => println!("will retry"),
//! }
//! ```

pub mod command;
pub mod edit;
pub mod file;
pub mod outcome;
pub mod question;

pub use command::CommandStep;
pub use edit::{BulkRegexEdit, EditRule, RegexEdit};
pub use file::{CopyFile, FileAppend};
pub use outcome::{Attempt, Outcome, Payload};
pub use question::QuestionStep;

use crate::error::{OutpostError, Result};
use crate::ui::OutputSink;

/// Attempt budget used when a step does not set its own.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// State shared by every step variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCore {
    /// Unique step name.
    pub name: String,

    /// Name of the single predecessor, if any.
    pub depends: Option<String>,

    /// Attempts made so far in this process.
    pub attempts: u32,

    /// Attempts allowed before the run is aborted.
    pub max_attempts: u32,
}

impl StepCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends: None,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Count a new attempt.
    ///
    /// Returns [`OutpostError::StepExhausted`] once the budget is spent; the
    /// caller must not do any work in that case.
    pub fn begin_attempt(&mut self) -> Result<u32> {
        if self.is_exhausted() {
            return Err(self.exhausted_error());
        }
        self.attempts += 1;
        Ok(self.attempts)
    }

    /// Whether the budget is spent, so the next `begin_attempt` would fail.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn exhausted_error(&self) -> OutpostError {
        OutpostError::StepExhausted {
            step: self.name.clone(),
            attempts: self.max_attempts,
        }
    }
}

/// A named, retryable unit of work with at most one predecessor.
///
/// Implementations must be safe to call again after a failed attempt and
/// must report failure through [`Attempt::Failed`] rather than an error.
/// Errors are reserved for conditions that should stop the whole run.
pub trait Step {
    fn core(&self) -> &StepCore;

    fn core_mut(&mut self) -> &mut StepCore;

    /// Execute one attempt, writing progress to `sink`.
    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt>;

    fn name(&self) -> &str {
        &self.core().name
    }

    fn depends(&self) -> Option<&str> {
        self.core().depends.as_deref()
    }

    fn set_depends(&mut self, depends: Option<String>) {
        self.core_mut().depends = depends;
    }

    fn attempts(&self) -> u32 {
        self.core().attempts
    }

    fn max_attempts(&self) -> u32 {
        self.core().max_attempts
    }

    /// Builder-style override of the attempt budget.
    fn with_max_attempts(mut self, max_attempts: u32) -> Self
    where
        Self: Sized,
    {
        self.core_mut().max_attempts = max_attempts;
        self
    }

    /// Builder-style predecessor.
    fn after(mut self, depends: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.core_mut().depends = Some(depends.into());
        self
    }
}
