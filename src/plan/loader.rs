//! Plan file loading and validation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OutpostError, Result};

use super::schema::{PlanConfig, StepConfig, StepKind};

/// A parsed plan bound to the directory its relative paths resolve against.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    path: PathBuf,
    base_dir: PathBuf,
    config: PlanConfig,
}

impl Plan {
    /// Load and validate the plan at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(OutpostError::PlanNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let plan = Self::parse(path, &content)?;
        debug!(
            "Loaded plan {} ({} stages, {} steps)",
            path.display(),
            plan.config.stages.len(),
            plan.steps().count()
        );
        Ok(plan)
    }

    /// Parse plan text as if it were read from `path`.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let config: PlanConfig =
            serde_yaml::from_str(content).map_err(|e| OutpostError::PlanParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let plan = Self {
            path: path.to_path_buf(),
            base_dir,
            config,
        };
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for step in self.steps() {
            if step.name.is_empty() {
                return Err(self.invalid("step with an empty name"));
            }
            if !seen.insert(step.name.as_str()) {
                return Err(self.invalid(format!("duplicate step name '{}'", step.name)));
            }
            if step.max_attempts == Some(0) {
                return Err(self.invalid(format!("step '{}' allows no attempts", step.name)));
            }
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> OutpostError {
        OutpostError::PlanParseError {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths in the plan resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Every step definition, in plan order.
    pub fn steps(&self) -> impl Iterator<Item = &StepConfig> {
        self.config
            .stages
            .iter()
            .flat_map(|stage| stage.chains.iter())
            .flat_map(|chain| chain.steps.iter())
    }

    /// Names of the question steps, in plan order.
    pub fn question_names(&self) -> Vec<&str> {
        self.steps()
            .filter(|step| matches!(step.kind, StepKind::Question { .. }))
            .map(|step| step.name.as_str())
            .collect()
    }
}
