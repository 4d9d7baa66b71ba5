mod loader;
pub mod template;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::hotkey::Hotkey;
pub use crate::logging::LogConfig;
pub use loader::{config_dir, config_path, load, try_load};

/// Top-level configuration for ShowAllFiles.
///
/// Loaded from `~/.config/showallfiles/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key combination that toggles hidden files.
    pub hotkey: Hotkey,
    /// Explorer refresh behaviour.
    pub refresh: RefreshConfig,
    /// File logging.
    pub logging: LogConfig,
}

/// Explorer refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Milliseconds to wait after an Explorer window takes focus before
    /// refreshing it, so the window has finished initialising.
    pub settle_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
        }
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Clamps values to safe ranges.
    pub fn validate(&mut self) {
        self.refresh.settle_delay_ms = self.refresh.settle_delay_ms.min(10_000);
        self.logging.max_backups = self.logging.max_backups.min(32);
        self.logging.max_file_mb = self.logging.max_file_mb.min(1024);
        if self.hotkey.key.trim().is_empty() {
            self.hotkey = Hotkey::default();
        }
    }

    /// Applies command-line overrides. Naming a log file enables file logging.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(file) = &overrides.log_file {
            self.logging.file = Some(file.clone());
            self.logging.enabled = true;
        }
    }
}
