//! Variable interpolation for plan strings.
//!
//! Plan values may reference outcomes recorded by earlier steps with
//! `${step_name}` syntax.
//!
//! # Syntax
//!
//! - `${step_name}` - replaced with the step's recorded outcome
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Example
//!
//! ```yaml
//! run: hostnamectl set-hostname ${hostname}
//! # With hostname answered as "db01", runs: hostnamectl set-hostname db01
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::error::{OutpostError, Result};
use crate::state::StateStore;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing `${var}` interpolations.
///
/// A `${` without a closing brace is kept as literal text.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                let mut var_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }

                if closed {
                    if !current_literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                    }
                    segments.push(Segment::Variable(var_name));
                } else {
                    current_literal.push_str("${");
                    current_literal.push_str(&var_name);
                }
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> HashSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Values available to `${name}` references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every outcome recorded in `state`, rendered as text.
    pub fn from_state(state: &StateStore) -> Self {
        Self(
            state
                .completed()
                .iter()
                .map(|(name, outcome)| (name.clone(), outcome.payload().as_text()))
                .collect(),
        )
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Resolve all variables in an interpolated string.
    ///
    /// # Errors
    ///
    /// Returns `UnknownVariable` for the first reference with no recorded value.
    pub fn resolve(&self, input: &str) -> Result<String> {
        let mut result = String::with_capacity(input.len());

        for segment in parse_interpolation(input) {
            match segment {
                Segment::Literal(text) => result.push_str(&text),
                Segment::Variable(name) => {
                    let value = self
                        .get(&name)
                        .ok_or_else(|| OutpostError::UnknownVariable { name: name.clone() })?;
                    result.push_str(value);
                }
            }
        }

        Ok(result)
    }
}
