//! Plan file schema.
//!
//! These structs map one-to-one onto the YAML plan format. String fields are
//! kept raw here; `${name}` references are resolved when a stage is built.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::shell::EnvOverlay;

/// Root of a plan file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    /// Environment overlay applied to every command step.
    #[serde(default, skip_serializing_if = "EnvOverlay::is_empty")]
    pub env: EnvOverlay,

    /// Stages, resolved in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// A group of chains resolved together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Only load this stage when the named step finished satisfied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

/// Steps run one after another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Predecessor of the first step in the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// A single step definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step name, also the key its outcome is recorded under.
    pub name: String,

    /// Attempt budget; the settings default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    #[serde(flatten)]
    pub kind: StepKind,
}

/// What a step does, selected by the `kind` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Run a shell command.
    Command {
        run: String,

        /// Working directory (relative to the plan file).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<PathBuf>,

        /// Layered over the plan-level overlay.
        #[serde(default, skip_serializing_if = "EnvOverlay::is_empty")]
        env: EnvOverlay,
    },

    /// Ask the operator for a line of text.
    Question {
        title: String,

        #[serde(default)]
        help: String,

        label: String,
    },

    /// Apply one search/replace rule to a file.
    RegexEdit {
        path: PathBuf,
        pattern: String,
        replace: String,
    },

    /// Apply rules to every matching file under a directory.
    BulkRegexEdit {
        dir: PathBuf,

        /// Regex matched against file names.
        files: String,

        rules: Vec<RuleConfig>,
    },

    /// Append a block of text to a file.
    FileAppend { path: PathBuf, text: String },

    /// Copy a file, creating the destination's parent directories.
    CopyFile { from: PathBuf, to: PathBuf },
}

impl StepKind {
    /// The `kind` tag as written in plan files.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Question { .. } => "question",
            Self::RegexEdit { .. } => "regex_edit",
            Self::BulkRegexEdit { .. } => "bulk_regex_edit",
            Self::FileAppend { .. } => "file_append",
            Self::CopyFile { .. } => "copy_file",
        }
    }
}

/// One search/replace rule of a bulk edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub pattern: String,
    pub replace: String,
}
