//! Outpost CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use outpost::cli::{Cli, CommandDispatcher};
use outpost::config::Settings;
use outpost::ui::{create_sink, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Diagnostics go to stderr so they never mix with step output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("outpost=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("outpost=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("Outpost starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let settings = match Settings::load(cli.home.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let mut sink = create_sink(
        cli.command.is_interactive(),
        output_mode,
        settings.log_dir.clone(),
    );

    let dispatcher = CommandDispatcher::new(settings);

    match dispatcher.dispatch(&cli.command, sink.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            sink.clear();
            sink.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
