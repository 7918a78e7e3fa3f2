//! Shell command supervision.
//!
//! - [`Supervisor`] - Runs a command through the shell, streaming its output
//!   and reporting descendant processes without blocking on reads
//! - [`EnvOverlay`] - Immutable environment variables applied at spawn time
//! - [`process_tree`] - Descendant process discovery

pub mod env;
pub mod lines;
pub mod process_tree;
pub mod supervisor;

pub use env::EnvOverlay;
pub use lines::LineBuffer;
pub use process_tree::{ProcessEvent, ProcessTracker};
pub use supervisor::{ExitReport, Supervisor};
