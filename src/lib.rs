//! Outpost - Resumable, dependency-aware step runner for host provisioning.
//!
//! Outpost drives long, fragile provisioning procedures (cloning
//! repositories, editing configuration files, running shell commands) as a
//! set of named steps. Progress is persisted after every attempt, so a run
//! that is interrupted or crashes resumes where it stopped.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading
//! - [`error`] - Error types and result aliases
//! - [`plan`] - YAML plan files and staged building
//! - [`runner`] - The dependency-resolving scheduler
//! - [`shell`] - Subprocess supervision and descendant tracking
//! - [`state`] - Persisted completion state
//! - [`steps`] - The step contract and its variants
//! - [`ui`] - Output sinks, step logs and prompts
//!
//! # Example
//!
//! ```no_run
//! use outpost::runner::Runner;
//! use outpost::state::StateStore;
//! use outpost::steps::{CommandStep, Step};
//! use outpost::ui::MockSink;
//! use std::path::Path;
//!
//! let state = StateStore::load(Path::new("/var/lib/outpost")).unwrap();
//! let mut runner = Runner::new(state);
//! runner.load_dependency_chain(
//!     vec![
//!         Box::new(CommandStep::new("update", "apt-get update")),
//!         Box::new(CommandStep::new("install", "apt-get install -y nginx")),
//!     ],
//!     None,
//! );
//!
//! let report = runner.resolve(&mut MockSink::new()).unwrap();
//! assert!(report.is_complete());
//! ```

#[cfg(not(unix))]
compile_error!("outpost supervises processes through POSIX APIs and only builds on unix");

pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{OutpostError, Result};
