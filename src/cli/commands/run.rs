//! Run command implementation.
//!
//! The `outpost run` command loads a plan and the persisted state, then
//! resolves the plan stage by stage. Steps completed by an earlier run are
//! skipped, so rerunning after an interruption picks up where it stopped.

use tracing::debug;

use crate::cli::args::RunArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::plan::{Plan, PlanExecutor};
use crate::runner::Runner;
use crate::state::StateStore;
use crate::ui::OutputSink;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    settings: Settings,
    args: RunArgs,
}

impl RunCommand {
    pub fn new(settings: &Settings, args: RunArgs) -> Self {
        Self {
            settings: settings.clone(),
            args,
        }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, sink: &mut dyn OutputSink) -> Result<CommandResult> {
        let plan = Plan::load(&self.args.plan)?;
        let state = StateStore::load(self.settings.state_dir())?;
        debug!("State file: {}", state.path().display());

        let executor = PlanExecutor::new(&plan, &self.settings);
        executor.check_answers(&state, sink)?;

        let already_done = state.completed().len();
        let mut runner = Runner::new(state);
        let report = executor.run(&mut runner, sink)?;
        sink.clear();

        if already_done > 0 && report.attempted() == 0 && report.is_complete() {
            sink.success("Nothing to do, every step already completed");
            return Ok(CommandResult::success());
        }

        for idx in &report.gated {
            sink.message(&format!("Stage {} skipped: its condition is not met", idx + 1));
        }

        let completed = report.completed().len();
        if report.is_complete() {
            sink.success(&format!(
                "{} step{} completed",
                completed,
                if completed == 1 { "" } else { "s" }
            ));
        } else {
            sink.warning(&format!(
                "{} step(s) still waiting on unsatisfied predecessors: {}",
                report.stalled.len(),
                report.stalled.join(", ")
            ));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutpostError;
    use crate::ui::MockSink;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(plan: &str) -> (TempDir, Settings, RunArgs) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yml");
        fs::write(&path, plan).unwrap();
        let settings = Settings::with_home(temp.path().join("home"));
        let args = RunArgs {
            plan: path,
            non_interactive: false,
        };
        (temp, settings, args)
    }

    const PLAN: &str = r#"
stages:
  - chains:
      - steps:
          - {name: first, kind: command, run: "echo one >> trail"}
          - {name: second, kind: command, run: "echo two >> trail"}
"#;

    #[test]
    fn execute_runs_plan_and_saves_state() {
        let (temp, settings, args) = setup(PLAN);
        let mut sink = MockSink::new();

        let result = RunCommand::new(&settings, args).execute(&mut sink).unwrap();

        assert!(result.success);
        assert_eq!(sink.successes(), ["2 steps completed"]);
        assert_eq!(
            fs::read_to_string(temp.path().join("trail")).unwrap(),
            "one\ntwo\n"
        );
        let state = StateStore::load(settings.state_dir()).unwrap();
        assert!(state.is_satisfied("first"));
        assert!(state.is_satisfied("second"));
    }

    #[test]
    fn second_execute_has_nothing_to_do() {
        let (temp, settings, args) = setup(PLAN);
        RunCommand::new(&settings, args.clone())
            .execute(&mut MockSink::new())
            .unwrap();

        let mut sink = MockSink::new();
        RunCommand::new(&settings, args).execute(&mut sink).unwrap();

        assert!(sink.started_steps().is_empty());
        assert!(sink.successes()[0].contains("Nothing to do"));
        assert_eq!(
            fs::read_to_string(temp.path().join("trail")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    fn execute_with_missing_plan_fails() {
        let (_temp, settings, _) = setup(PLAN);
        let args = RunArgs {
            plan: PathBuf::from("/nonexistent/plan.yml"),
            non_interactive: false,
        };

        let err = RunCommand::new(&settings, args)
            .execute(&mut MockSink::new())
            .unwrap_err();
        assert!(matches!(err, OutpostError::PlanNotFound { .. }));
    }

    #[test]
    fn unanswerable_question_aborts_before_running() {
        let (temp, settings, args) = setup(
            r#"
stages:
  - chains:
      - steps:
          - {name: touch, kind: command, run: "touch ran"}
          - {name: hostname, kind: question, title: Host name, label: Hostname}
"#,
        );
        let mut sink = MockSink::new();
        sink.set_interactive(false);

        let err = RunCommand::new(&settings, args).execute(&mut sink).unwrap_err();

        assert!(matches!(err, OutpostError::PromptUnavailable { .. }));
        assert!(!temp.path().join("ran").exists());
        assert!(sink.started_steps().is_empty());
    }

    #[test]
    fn stalled_steps_are_warned_about() {
        let (_temp, settings, args) = setup(
            r#"
stages:
  - chains:
      - steps:
          - {name: email, kind: question, title: Admin email, label: Email}
          - {name: notify, kind: command, run: "true"}
"#,
        );
        let mut sink = MockSink::new();
        sink.queue_answers(&[""]);

        let result = RunCommand::new(&settings, args).execute(&mut sink).unwrap();

        assert!(result.success);
        assert!(sink.has_warning("notify"));
    }
}
