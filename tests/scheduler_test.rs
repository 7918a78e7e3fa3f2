//! Integration tests for the scheduler, driven through the public API.

use outpost::error::OutpostError;
use outpost::runner::Runner;
use outpost::state::StateStore;
use outpost::steps::{CommandStep, QuestionStep, Step};
use outpost::ui::MockSink;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const POLL: Duration = Duration::from_millis(5);

/// A command step that appends its name to `trail` in `dir`.
fn recorder(name: &str, dir: &Path) -> Box<dyn Step> {
    Box::new(
        CommandStep::new(name, format!("echo {} >> trail", name))
            .in_dir(dir)
            .with_poll_interval(POLL),
    )
}

/// A command step that fails until its `fails`+1-th attempt.
fn flaky(name: &str, dir: &Path, fails: u32, max_attempts: u32) -> Box<dyn Step> {
    let script = format!(
        "n=$(cat {name}.count 2>/dev/null || echo 0); n=$((n+1)); echo $n > {name}.count; [ $n -gt {fails} ]"
    );
    Box::new(
        CommandStep::new(name, script)
            .in_dir(dir)
            .with_poll_interval(POLL)
            .with_max_attempts(max_attempts),
    )
}

fn trail(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("trail"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn runner(state_dir: &Path) -> Runner {
    Runner::new(StateStore::load(state_dir).unwrap())
}

#[test]
fn dependent_runs_after_predecessor_in_one_call() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_dependency_chain(
        vec![recorder("a", work.path()), recorder("b", work.path())],
        None,
    );

    let report = runner.resolve(&mut MockSink::new()).unwrap();

    assert_eq!(trail(work.path()), vec!["a", "b"]);
    assert_eq!(report.completed, vec!["a", "b"]);
    assert!(runner.state().is_satisfied("a"));
    assert!(runner.state().is_satisfied("b"));
    assert!(runner.is_empty());
}

#[test]
fn flaky_step_is_retried_until_it_succeeds() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_step(flaky("a", work.path(), 2, 5));
    let mut sink = MockSink::new();

    let report = runner.resolve(&mut sink).unwrap();

    assert_eq!(sink.attempts_of("a"), 3);
    assert_eq!(report.failures, 2);
    assert_eq!(runner.state().counter(), 3);
    assert!(runner.state().is_satisfied("a"));
    assert!(sink.has_line("exit code 1"));
    assert!(sink.has_line("exit code 0"));
}

#[test]
fn exhausted_step_aborts_after_exact_budget() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_step(flaky("a", work.path(), u32::MAX, 3));

    let err = runner.resolve(&mut MockSink::new()).unwrap_err();

    assert!(matches!(
        err,
        OutpostError::StepExhausted { ref step, attempts: 3 } if step == "a"
    ));
    let count = fs::read_to_string(work.path().join("a.count")).unwrap();
    assert_eq!(count.trim(), "3");

    let state = StateStore::load(home.path()).unwrap();
    assert!(!state.is_complete("a"));
    assert_eq!(state.counter(), 3);
}

#[test]
fn independent_chains_interleave_by_pass() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_dependency_chain(
        vec![recorder("s1", work.path()), recorder("s2", work.path())],
        None,
    );
    runner.load_dependency_chain(vec![recorder("s3", work.path())], None);

    let report = runner.resolve(&mut MockSink::new()).unwrap();

    assert_eq!(trail(work.path()), vec!["s1", "s3", "s2"]);
    assert_eq!(report.passes, 3);
    assert_eq!(report.attempted, 3);
}

#[test]
fn completed_step_is_never_invoked_again() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join(StateStore::FILE_NAME),
        r#"{"completed": {"a": true}, "counter": 4}"#,
    )
    .unwrap();

    let mut runner = runner(home.path());
    runner.load_step(recorder("a", work.path()));
    let mut sink = MockSink::new();
    let report = runner.resolve(&mut sink).unwrap();

    assert_eq!(report.skipped, vec!["a"]);
    assert_eq!(report.attempted, 0);
    assert!(sink.started_steps().is_empty());
    assert!(trail(work.path()).is_empty());
}

#[test]
fn empty_answer_leaves_dependent_pending() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_dependency_chain(
        vec![
            Box::new(QuestionStep::new("email", "Admin email", "", "Email")),
            recorder("notify", work.path()),
        ],
        None,
    );
    let mut sink = MockSink::new();
    sink.queue_answers(&[""]);

    let report = runner.resolve(&mut sink).unwrap();

    assert!(runner.state().is_complete("email"));
    assert!(!runner.state().is_satisfied("email"));
    assert_eq!(report.stalled, vec!["notify"]);
    assert_eq!(runner.pending(), vec!["notify"]);
    assert_eq!(sink.attempts_of("notify"), 0);
    assert!(trail(work.path()).is_empty());
}

#[test]
fn resume_after_abort_finishes_remaining_steps() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    // First invocation: "b" exhausts its budget after "a" completed.
    {
        let mut runner = runner(home.path());
        runner.load_dependency_chain(
            vec![
                recorder("a", work.path()),
                flaky("b", work.path(), 2, 2),
                recorder("c", work.path()),
            ],
            None,
        );
        assert!(runner.resolve(&mut MockSink::new()).is_err());
    }
    assert_eq!(trail(work.path()), vec!["a"]);
    let counter_after_crash = StateStore::load(home.path()).unwrap().counter();

    // Second invocation: fresh attempt budget, "a" is not rerun.
    let mut runner = runner(home.path());
    runner.load_dependency_chain(
        vec![
            recorder("a", work.path()),
            flaky("b", work.path(), 2, 2),
            recorder("c", work.path()),
        ],
        None,
    );
    let report = runner.resolve(&mut MockSink::new()).unwrap();

    assert_eq!(report.skipped, vec!["a"]);
    assert_eq!(trail(work.path()), vec!["a", "c"]);
    let state = runner.into_state();
    assert!(state.is_satisfied("b"));
    assert!(state.is_satisfied("c"));
    assert_eq!(state.counter(), counter_after_crash + 2);
}

#[test]
fn counter_survives_restarts_and_never_decreases() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut seen = Vec::new();

    for round in 0..3 {
        let mut runner = runner(home.path());
        runner.load_step(recorder(&format!("step{}", round), work.path()));
        let mut sink = MockSink::new();
        runner.resolve(&mut sink).unwrap();
        seen.extend(sink.started().iter().map(|s| s.index));
        seen.push(runner.state().counter());
    }

    assert_eq!(seen, vec![0, 1, 1, 2, 2, 3]);
    assert_eq!(StateStore::load(home.path()).unwrap().counter(), 3);
}

#[test]
fn dependent_never_runs_before_predecessor_is_recorded() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    // Loaded in reverse so registry order alone would run "late" first.
    runner.load_step(Box::new(
        CommandStep::new("late", "test -f early.done && echo late >> trail")
            .in_dir(work.path())
            .with_poll_interval(POLL)
            .with_max_attempts(1)
            .after("early"),
    ));
    runner.load_step(Box::new(
        CommandStep::new("early", "touch early.done && echo early >> trail")
            .in_dir(work.path())
            .with_poll_interval(POLL),
    ));

    runner.resolve(&mut MockSink::new()).unwrap();

    assert_eq!(trail(work.path()), vec!["early", "late"]);
}

#[test]
fn reloading_a_step_replaces_its_definition() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let mut runner = runner(home.path());
    runner.load_step(Box::new(
        CommandStep::new("a", "echo old >> trail").in_dir(work.path()),
    ));
    runner.load_step(recorder("b", work.path()));
    runner.load_step(Box::new(
        CommandStep::new("a", "echo new >> trail").in_dir(work.path()),
    ));

    runner.resolve(&mut MockSink::new()).unwrap();

    assert_eq!(trail(work.path()), vec!["new", "b"]);
}
