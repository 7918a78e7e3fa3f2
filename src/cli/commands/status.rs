//! Status command implementation.
//!
//! The `outpost status` command shows what the persisted state records.

use crate::cli::args::StatusArgs;
use crate::config::Settings;
use crate::error::{OutpostError, Result};
use crate::state::StateStore;
use crate::ui::OutputSink;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    settings: Settings,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(settings: &Settings, args: StatusArgs) -> Self {
        Self {
            settings: settings.clone(),
            args,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, sink: &mut dyn OutputSink) -> Result<CommandResult> {
        let state = StateStore::load(self.settings.state_dir())?;

        if self.args.json {
            let json = serde_json::to_string_pretty(state.state())
                .map_err(|e| OutpostError::Other(e.into()))?;
            sink.message(&json);
            return Ok(CommandResult::success());
        }

        sink.message(&format!("State: {}", state.path().display()));
        sink.message(&format!("Attempts so far: {}", state.counter()));

        if state.completed().is_empty() {
            sink.message("No steps completed yet");
            return Ok(CommandResult::success());
        }

        sink.message("Completed steps:");
        for (name, outcome) in state.completed() {
            if outcome.is_satisfied() {
                sink.message(&format!("  ✓ {}: {}", name, outcome));
            } else {
                sink.message(&format!(
                    "  ○ {}: {:?} (unsatisfied, dependents stay pending)",
                    name,
                    outcome.to_string()
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
