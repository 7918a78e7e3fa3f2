//! Shell command steps.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::shell::{EnvOverlay, Supervisor};
use crate::ui::OutputSink;

use super::{Attempt, Outcome, Step, StepCore};

/// Runs a shell command and succeeds iff it exits with code zero.
#[derive(Debug, Clone)]
pub struct CommandStep {
    core: StepCore,
    command: String,
    cwd: PathBuf,
    env: EnvOverlay,
    supervisor: Supervisor,
}

impl CommandStep {
    /// Create a command step running in the current directory.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            core: StepCore::new(name),
            command: command.into(),
            cwd: PathBuf::from("."),
            env: EnvOverlay::new(),
            supervisor: Supervisor::default(),
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_env(mut self, env: EnvOverlay) -> Self {
        self.env = env;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.supervisor = Supervisor::new(interval);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn env(&self) -> &EnvOverlay {
        &self.env
    }
}

impl Step for CommandStep {
    fn core(&self) -> &StepCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StepCore {
        &mut self.core
    }

    fn run(&mut self, sink: &mut dyn OutputSink) -> Result<Attempt> {
        let attempt = self.core.begin_attempt()?;
        debug!(
            "Running '{}' (attempt {}/{}) in {}",
            self.core.name,
            attempt,
            self.core.max_attempts,
            self.cwd.display()
        );

        sink.emit(&format!("$ {}", self.command))?;
        let report = self
            .supervisor
            .run(&self.command, &self.cwd, &self.env, sink)?;

        if report.success() {
            Ok(Attempt::Done(Outcome::success()))
        } else {
            Ok(Attempt::Failed)
        }
    }
}
