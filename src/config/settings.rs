//! Settings loading.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{OutpostError, Result};
use crate::shell::supervisor::DEFAULT_POLL_INTERVAL;
use crate::steps::DEFAULT_MAX_ATTEMPTS;

/// Smallest accepted supervisor poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Optional overrides read from `<home>/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Where per-step logs go (relative paths are resolved against home).
    pub log_dir: Option<PathBuf>,

    /// Milliseconds between supervisor poll iterations.
    pub poll_interval_ms: Option<u64>,

    /// Attempt budget for steps that do not set one.
    pub max_attempts: Option<u32>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Per-tool directory holding the state file and logs.
    pub home: PathBuf,

    pub log_dir: PathBuf,

    pub poll_interval: Duration,

    pub max_attempts: u32,
}

impl Settings {
    /// Name of the optional settings file inside home.
    pub const FILE_NAME: &'static str = "config.yml";

    /// `~/.outpost`, or `./.outpost` when no home directory is known.
    pub fn default_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".outpost")
    }

    /// Defaults rooted at `home`.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            log_dir: home.join("logs"),
            home,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Resolve settings for `home` (default home when `None`).
    pub fn load(home: Option<PathBuf>) -> Result<Self> {
        let home = home.unwrap_or_else(Self::default_home);
        let mut settings = Self::with_home(&home);

        let path = home.join(Self::FILE_NAME);
        if path.exists() {
            let file = Self::read_file(&path)?;
            settings.apply(file, &path)?;
        }

        Ok(settings)
    }

    fn read_file(path: &Path) -> Result<SettingsFile> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(SettingsFile::default());
        }
        serde_yaml::from_str(&content).map_err(|e| OutpostError::SettingsError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn apply(&mut self, file: SettingsFile, path: &Path) -> Result<()> {
        let invalid = |message: String| OutpostError::SettingsError {
            path: path.to_path_buf(),
            message,
        };

        if let Some(dir) = file.log_dir {
            self.log_dir = self.home.join(dir);
        }
        if let Some(ms) = file.poll_interval_ms {
            if ms < MIN_POLL_INTERVAL_MS {
                return Err(invalid(format!(
                    "poll_interval_ms must be at least {}, got {}",
                    MIN_POLL_INTERVAL_MS, ms
                )));
            }
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(max) = file.max_attempts {
            if max == 0 {
                return Err(invalid("max_attempts must be at least 1".to_string()));
            }
            self.max_attempts = max;
        }
        Ok(())
    }

    /// Directory holding the state file.
    pub fn state_dir(&self) -> &Path {
        &self.home
    }
}
