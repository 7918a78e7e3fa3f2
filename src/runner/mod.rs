//! Step scheduling.

pub mod scheduler;

pub use scheduler::{ResolveReport, Runner};
