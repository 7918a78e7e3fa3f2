//! Error types for Outpost operations.
//!
//! This module defines [`OutpostError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A step that fails returns [`Attempt::Failed`](crate::steps::Attempt), it never
//!   raises an error; the scheduler retries it.
//! - Retry exhaustion and I/O failures are `OutpostError`s and abort the run.
//! - Use `anyhow::Error` (via `OutpostError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Outpost operations.
#[derive(Debug, Error)]
pub enum OutpostError {
    /// A step kept failing until its attempt budget ran out.
    #[error("Step '{step}' failed repeatedly ({attempts} attempts), giving up")]
    StepExhausted { step: String, attempts: u32 },

    /// The persisted state file could not be parsed.
    #[error("Failed to parse state at {path}: {message}")]
    StateParseError { path: PathBuf, message: String },

    /// Plan file not found at the given location.
    #[error("Plan not found: {path}")]
    PlanNotFound { path: PathBuf },

    /// Failed to parse or validate a plan file.
    #[error("Failed to parse plan at {path}: {message}")]
    PlanParseError { path: PathBuf, message: String },

    /// Failed to parse or validate the settings file.
    #[error("Invalid settings in {path}: {message}")]
    SettingsError { path: PathBuf, message: String },

    /// A search/replace rule carries an invalid regular expression.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A plan string references an answer that has not been recorded.
    #[error("Unknown variable: {name}")]
    UnknownVariable { name: String },

    /// A question cannot be answered by the current sink.
    #[error("Cannot prompt for '{label}': {reason}")]
    PromptUnavailable { label: String, reason: String },

    /// The shell could not be spawned for a command step.
    #[error("Failed to spawn '{command}': {message}")]
    CommandSpawn { command: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Outpost operations.
pub type Result<T> = std::result::Result<T, OutpostError>;
