//! Reset command implementation.
//!
//! The `outpost reset` command forgets completed steps so the next run
//! executes them again. The attempt counter is never reset, so log file
//! names stay unique.

use crate::cli::args::ResetArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::state::StateStore;
use crate::ui::OutputSink;

use super::dispatcher::{Command, CommandResult};

/// The reset command implementation.
pub struct ResetCommand {
    settings: Settings,
    args: ResetArgs,
}

impl ResetCommand {
    pub fn new(settings: &Settings, args: ResetArgs) -> Self {
        Self {
            settings: settings.clone(),
            args,
        }
    }
}

impl Command for ResetCommand {
    fn execute(&self, sink: &mut dyn OutputSink) -> Result<CommandResult> {
        if !self.args.all && self.args.steps.is_empty() {
            sink.error("Nothing to reset: name the steps to forget or pass --all");
            return Ok(CommandResult::failure(2));
        }

        let mut state = StateStore::load(self.settings.state_dir())?;

        if self.args.all {
            let count = state.completed().len();
            state.forget_all();
            state.save()?;
            sink.success(&format!("Forgot {} completed step(s)", count));
            return Ok(CommandResult::success());
        }

        let mut forgotten = 0;
        for name in &self.args.steps {
            if state.forget(name) {
                forgotten += 1;
            } else {
                sink.warning(&format!("'{}' is not recorded as completed", name));
            }
        }
        state.save()?;
        sink.success(&format!("Forgot {} completed step(s)", forgotten));

        Ok(CommandResult::success())
    }
}
