//! Output sinks: where step output goes while the runner works.
//!
//! This module provides:
//! - [`OutputSink`] trait consumed by steps and the runner
//! - [`TerminalSink`] for an attended terminal with a live status line
//! - [`NonInteractiveSink`] for headless runs
//! - [`MockSink`] for tests
//! - [`StepLog`] per-step log files shared by the real sinks
//!
//! # Example
//!
//! ```
//! use outpost::ui::{MockSink, OutputSink};
//!
//! let mut sink = MockSink::new();
//! sink.queue_answers(&["db01"]);
//!
//! sink.emit("Cloning into 'infra'...").unwrap();
//! assert_eq!(sink.prompt("Hostname").unwrap(), "db01");
//! assert!(sink.has_line("Cloning"));
//! ```

pub mod log;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod sanitize;
pub mod terminal;
pub mod theme;

pub use log::StepLog;
pub use mock::MockSink;
pub use non_interactive::NonInteractiveSink;
pub use output::OutputMode;
pub use sanitize::sanitize;
pub use terminal::TerminalSink;
pub use theme::{should_use_colors, OutpostTheme};

use std::path::PathBuf;

use crate::error::Result;
use crate::steps::Attempt;

/// Destination for everything a running step reports.
///
/// Implementations mirror step output into a per-step log file and a live
/// display. `prompt` is the only blocking operation and is used only by
/// question steps.
pub trait OutputSink {
    /// A step attempt is about to run. `index` is the global attempt counter,
    /// `remaining` the number of steps still pending.
    fn start_step(&mut self, index: u64, name: &str, remaining: usize) -> Result<()>;

    /// Append text (one or more lines) to the current step's output.
    fn emit(&mut self, text: &str) -> Result<()>;

    /// The attempt started by `start_step` has finished.
    fn finish_step(&mut self, name: &str, attempt: &Attempt) -> Result<()>;

    /// Reset the live display area.
    fn clear(&mut self);

    /// Ask for a line of free text.
    fn prompt(&mut self, label: &str) -> Result<String>;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Whether `prompt` can reach a person.
    fn is_interactive(&self) -> bool;

    /// Whether the question step `step` can be answered by this sink.
    fn can_answer(&self, step: &str) -> bool {
        let _ = step;
        self.is_interactive()
    }

    /// Why the question step `step` cannot be answered, for error messages.
    fn answer_hint(&self, step: &str) -> String {
        let _ = step;
        "no interactive terminal".to_string()
    }
}

/// Create the sink for this process.
pub fn create_sink(interactive: bool, mode: OutputMode, log_dir: PathBuf) -> Box<dyn OutputSink> {
    if interactive && console::user_attended() {
        Box::new(TerminalSink::new(mode, log_dir))
    } else {
        Box::new(NonInteractiveSink::new(mode, log_dir))
    }
}
