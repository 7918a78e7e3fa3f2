//! Persisted run state.
//!
//! The state file is the resumability contract: it records which steps have
//! completed (with their outcomes) and the global attempt counter, and it is
//! rewritten atomically after every attempt.

pub mod atomic;
pub mod store;

pub use atomic::write_atomic;
pub use store::{PersistedState, StateStore};
