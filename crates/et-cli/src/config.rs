//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Seconds between automatic saves during `et run`.
    pub autosave_interval_secs: u64,

    /// Milliseconds between status line redraws during `et run`.
    pub tick_interval_ms: u64,

    /// Restart the active file's timer when it is re-included.
    pub resume_on_include: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("et.db"),
            autosave_interval_secs: 5 * 60,
            tick_interval_ms: 1_000,
            resume_on_include: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ET_*)
        figment = figment.merge(Env::prefixed("ET_"));

        figment.extract()
    }

    /// Auto-save period. Never zero.
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    /// Redraw period. Never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Returns the platform-specific config directory for et.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("et"))
}

/// Returns the platform-specific data directory for et.
///
/// On Linux: `~/.local/share/et`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("et"))
}
