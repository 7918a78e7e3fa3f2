//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::Commands;
use crate::config::Settings;
use crate::error::Result;
use crate::ui::OutputSink;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, reporting through `sink`.
    fn execute(&self, sink: &mut dyn OutputSink) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    settings: Settings,
}

impl CommandDispatcher {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, command: &Commands, sink: &mut dyn OutputSink) -> Result<CommandResult> {
        match command {
            Commands::Run(args) => {
                super::run::RunCommand::new(&self.settings, args.clone()).execute(sink)
            }
            Commands::Status(args) => {
                super::status::StatusCommand::new(&self.settings, args.clone()).execute(sink)
            }
            Commands::Reset(args) => {
                super::reset::ResetCommand::new(&self.settings, args.clone()).execute(sink)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::StatusArgs;
    use crate::ui::MockSink;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn dispatches_status() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(Settings::with_home(temp.path()));
        let mut sink = MockSink::new();

        let result = dispatcher
            .dispatch(&Commands::Status(StatusArgs::default()), &mut sink)
            .unwrap();

        assert!(result.success);
        assert_eq!(dispatcher.settings().home, temp.path());
    }
}
