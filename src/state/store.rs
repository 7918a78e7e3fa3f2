//! Persistent state storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OutpostError, Result};
use crate::steps::Outcome;

use super::atomic::write_atomic;

/// On-disk contents of the state file.
///
/// Serialized as pretty JSON; `BTreeMap` keeps the keys sorted so the file
/// diffs cleanly between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Finished steps and their outcomes.
    ///
    /// Besides satisfied outcomes this also holds unsatisfied question
    /// answers (an empty string): the question is not asked again, but its
    /// dependents stay blocked. Use [`StateStore::is_satisfied`] to tell them
    /// apart.
    #[serde(default)]
    pub completed: BTreeMap<String, Outcome>,

    /// Step attempts made so far, across all invocations.
    #[serde(default)]
    pub counter: u64,
}

/// State bound to its file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    /// Name of the state file inside the state directory.
    pub const FILE_NAME: &'static str = "state.json";

    /// Load state from `dir`, creating the directory if needed.
    ///
    /// A missing file yields empty state. A corrupt file is an error; there is
    /// no attempt to repair it.
    pub fn load(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);

        if !path.exists() {
            debug!("No state at {}, starting fresh", path.display());
            return Ok(Self {
                path,
                state: PersistedState::default(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let state: PersistedState =
            serde_json::from_str(&content).map_err(|e| OutpostError::StateParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        debug!(
            "Loaded state: {} completed, counter {}",
            state.completed.len(),
            state.counter
        );

        Ok(Self { path, state })
    }

    /// Save state to disk using atomic write.
    ///
    /// A kill at any point leaves either the old or the new state.
    pub fn save(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.state)
            .map_err(|e| OutpostError::Other(e.into()))?;
        content.push('\n');

        write_atomic(&self.path, content.as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn completed(&self) -> &BTreeMap<String, Outcome> {
        &self.state.completed
    }

    pub fn counter(&self) -> u64 {
        self.state.counter
    }

    /// Count one step attempt, returning the new counter.
    pub fn bump_counter(&mut self) -> u64 {
        self.state.counter += 1;
        self.state.counter
    }

    /// Whether `name` has finished, in this or an earlier invocation.
    pub fn is_complete(&self, name: &str) -> bool {
        self.state.completed.contains_key(name)
    }

    /// Whether `name` finished with an outcome that unblocks dependents.
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.state
            .completed
            .get(name)
            .is_some_and(Outcome::is_satisfied)
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.state.completed.get(name)
    }

    pub fn record(&mut self, name: &str, outcome: Outcome) {
        self.state.completed.insert(name.to_string(), outcome);
    }

    /// Forget a completion so the step runs again. Returns whether it was recorded.
    pub fn forget(&mut self, name: &str) -> bool {
        self.state.completed.remove(name).is_some()
    }

    /// Forget every completion. The counter is kept.
    pub fn forget_all(&mut self) {
        self.state.completed.clear();
    }
}
