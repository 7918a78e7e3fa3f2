//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Outpost - Resumable step runner for host provisioning.
#[derive(Debug, Parser)]
#[command(name = "outpost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding state, logs and config.yml (default: ~/.outpost)
    #[arg(long, global = true, env = "OUTPOST_HOME")]
    pub home: Option<PathBuf>,

    /// Only show step headers and results, not command output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a plan, resuming where the last run stopped
    Run(RunArgs),

    /// Show completed steps and the attempt counter
    Status(StatusArgs),

    /// Forget completed steps so they run again
    Reset(ResetArgs),
}

impl Commands {
    /// Whether this command may prompt the operator.
    pub fn is_interactive(&self) -> bool {
        match self {
            Self::Run(args) => !args.non_interactive,
            Self::Status(_) | Self::Reset(_) => false,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Plan file to run
    pub plan: PathBuf,

    /// Never prompt; questions are answered from OUTPOST_ANSWER_<STEP>
    #[arg(long)]
    pub non_interactive: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output the state file contents as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResetArgs {
    /// Steps to forget
    pub steps: Vec<String>,

    /// Forget every completed step
    #[arg(long, conflicts_with = "steps")]
    pub all: bool,
}
