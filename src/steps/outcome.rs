//! Step outcomes.
//!
//! Every finished step produces an [`Outcome`]: a payload the plan can read
//! back later (a question's answer, an edit summary) plus a `satisfied` flag
//! that decides whether dependents may run. The flag is derived from the
//! payload's truthiness once, when the outcome is built, so the scheduler
//! never coerces values itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by an outcome.
///
/// Stored in the state file as its natural JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl Payload {
    /// Non-empty, non-zero and non-false payloads are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Get the payload as text, suitable for interpolation.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Result value of a completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Payload", into = "Payload")]
pub struct Outcome {
    satisfied: bool,
    payload: Payload,
}

impl Outcome {
    /// Plain success, used by commands, appends and copies.
    pub fn success() -> Self {
        Self::from(Payload::Bool(true))
    }

    /// Free text outcome. Empty text does not satisfy dependents.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from(Payload::Text(text.into()))
    }

    /// Whether dependents of the step may run.
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl From<Payload> for Outcome {
    fn from(payload: Payload) -> Self {
        Self {
            satisfied: payload.is_truthy(),
            payload,
        }
    }
}

impl From<Outcome> for Payload {
    fn from(outcome: Outcome) -> Self {
        outcome.payload
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)
    }
}

/// What a single call to [`Step::run`](super::Step::run) produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// The step finished and leaves the registry.
    Done(Outcome),
    /// The step failed and stays pending for another attempt.
    Failed,
}

impl Attempt {
    /// Whether this attempt lets dependents proceed.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Done(outcome) if outcome.is_satisfied())
    }
}
