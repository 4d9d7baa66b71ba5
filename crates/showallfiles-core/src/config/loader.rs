use std::path::PathBuf;

use super::Config;
use crate::{Error, Result};

/// Returns the config directory: `~/.config/showallfiles/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("showallfiles"))
}

/// Returns the config file path: `~/.config/showallfiles/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Tries to load and parse `config.toml`.
pub fn try_load() -> Result<Config> {
    let path = config_path().ok_or(Error::Config("could not determine config path".into()))?;
    let content = std::fs::read_to_string(&path)?;
    parse(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Loads the configuration from disk, falling back to defaults.
///
/// A missing file silently yields defaults; any other failure is
/// logged as a warning.
pub fn load() -> Config {
    match try_load() {
        Ok(config) => config,
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            log::warn!("{e}");
            Config::default()
        }
    }
}

/// Parses config text and clamps the result.
pub(super) fn parse(content: &str) -> std::result::Result<Config, toml::de::Error> {
    let mut config: Config = toml::from_str(content)?;
    config.validate();
    Ok(config)
}
