//! Environment overlays for command steps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Command;

/// Environment variables layered over the base process environment.
///
/// Overlays are values: layering returns a new overlay and nothing touches
/// the runner's own environment. The base environment is only consulted when
/// a command is spawned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvOverlay(BTreeMap<String, String>);

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Return a copy with `top` layered over this overlay; `top` wins on conflicts.
    pub fn layered(&self, top: &EnvOverlay) -> EnvOverlay {
        let mut merged = self.0.clone();
        merged.extend(top.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        EnvOverlay(merged)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply the overlay to a command about to be spawned.
    pub fn apply(&self, cmd: &mut Command) {
        cmd.envs(self.iter());
    }
}

impl FromIterator<(String, String)> for EnvOverlay {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
