//! Runner settings.
//!
//! Settings are resolved in priority order:
//! 1. Command-line flags and environment (`--home` / `OUTPOST_HOME`)
//! 2. `<home>/config.yml`
//! 3. Built-in defaults

pub mod settings;

pub use settings::{Settings, SettingsFile};
