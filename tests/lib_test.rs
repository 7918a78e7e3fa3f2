//! Library integration tests.

use outpost::OutpostError;

#[test]
fn error_types_are_public() {
    let err = OutpostError::UnknownVariable {
        name: "hostname".into(),
    };
    assert!(err.to_string().contains("hostname"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> outpost::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use outpost::cli::{Cli, Commands};

    let cli = Cli::parse_from(["outpost", "status", "--json"]);

    if let Commands::Status(args) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn custom_steps_plug_into_the_runner() {
    use outpost::runner::Runner;
    use outpost::state::StateStore;
    use outpost::steps::{Attempt, Outcome, Step, StepCore};
    use outpost::ui::{MockSink, OutputSink};

    struct Probe {
        core: StepCore,
    }

    impl Step for Probe {
        fn core(&self) -> &StepCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut StepCore {
            &mut self.core
        }

        fn run(&mut self, sink: &mut dyn OutputSink) -> outpost::Result<Attempt> {
            self.core.begin_attempt()?;
            sink.emit("probing")?;
            Ok(Attempt::Done(Outcome::from(outpost::steps::Payload::Number(3))))
        }
    }

    let temp = tempfile::TempDir::new().unwrap();
    let mut runner = Runner::new(StateStore::load(temp.path()).unwrap());
    runner.load_step(Box::new(Probe {
        core: StepCore::new("probe"),
    }));
    let mut sink = MockSink::new();

    let report = runner.resolve(&mut sink).unwrap();

    assert_eq!(report.completed, vec!["probe"]);
    assert!(sink.has_line("probing"));
    assert!(runner.state().is_satisfied("probe"));
}
