//! Interactive terminal sink.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::error::{OutpostError, Result};
use crate::steps::Attempt;

use super::{sanitize, should_use_colors, OutpostTheme, OutputMode, OutputSink, StepLog};

/// Convert dialoguer errors to OutpostError.
fn map_dialoguer_err(e: dialoguer::Error) -> OutpostError {
    OutpostError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Terminal sink with a status line pinned below the streaming output.
///
/// The status line is ticked from the driving thread on every write; no
/// background ticker is started.
pub struct TerminalSink {
    term: Term,
    theme: OutpostTheme,
    status: ProgressBar,
    log: StepLog,
    mode: OutputMode,
    shown: usize,
}

impl TerminalSink {
    pub fn new(mode: OutputMode, log_dir: impl Into<PathBuf>) -> Self {
        let theme = if should_use_colors() {
            OutpostTheme::new()
        } else {
            OutpostTheme::plain()
        };

        let status = ProgressBar::new_spinner();
        status.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        Self {
            term: Term::stdout(),
            theme,
            status,
            log: StepLog::new(log_dir),
            mode,
            shown: 0,
        }
    }

    fn print(&mut self, line: String) {
        self.status.println(line);
        self.shown += 1;
    }
}

impl OutputSink for TerminalSink {
    fn start_step(&mut self, index: u64, name: &str, remaining: usize) -> Result<()> {
        self.log.open(index, name)?;
        self.status
            .set_message(self.theme.format_status(name, remaining));
        self.status.tick();
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.log.write(text)?;
        if self.mode.shows_command_output() {
            for line in text.split('\n') {
                self.print(sanitize(line));
            }
        }
        self.status.tick();
        Ok(())
    }

    fn finish_step(&mut self, name: &str, attempt: &Attempt) -> Result<()> {
        let line = match attempt {
            Attempt::Done(outcome) if outcome.is_satisfied() => {
                self.theme.format_success(&format!("{} ({})", name, outcome))
            }
            Attempt::Done(_) => self
                .theme
                .format_warning(&format!("{} (empty, dependents stay pending)", name)),
            Attempt::Failed => self.theme.format_error(&format!("{} failed, will retry", name)),
        };
        self.log.write(&sanitize(&line))?;
        self.log.close()?;
        self.status.println(line);
        Ok(())
    }

    fn clear(&mut self) {
        let shown = self.shown;
        let term = &self.term;
        self.status.suspend(|| term.clear_last_lines(shown).ok());
        self.shown = 0;
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        let term = &self.term;
        let answer: String = self
            .status
            .suspend(|| {
                Input::<String>::with_theme(&prompt_theme())
                    .with_prompt(label)
                    .allow_empty(true)
                    .interact_on(term)
            })
            .map_err(map_dialoguer_err)?;

        self.log.write(&format!("{}: {}", label, answer))?;
        Ok(answer)
    }

    fn message(&mut self, msg: &str) {
        self.status.suspend(|| self.term.write_line(msg).ok());
    }

    fn success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.status.suspend(|| self.term.write_line(&line).ok());
    }

    fn warning(&mut self, msg: &str) {
        let line = self.theme.format_warning(msg);
        self.status.suspend(|| self.term.write_line(&line).ok());
    }

    fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.status.suspend(|| self.term.write_line(&line).ok());
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.status.finish_and_clear();
        let _ = self.log.close();
    }
}
