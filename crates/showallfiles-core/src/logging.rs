//! Process-wide logger behind the `log` facade.
//!
//! Every line goes to stderr. When file logging is enabled, lines are
//! also appended to `showallfiles.log` (by default under
//! `~/.config/showallfiles/logs/`). Once the file exceeds the configured
//! size it is rotated to `showallfiles.log.1`, older backups shifting up
//! to `max_backups`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::{Deserialize, Serialize};

static LOGGER: OnceLock<Logger> = OnceLock::new();

const LOG_FILE_NAME: &str = "showallfiles.log";
const SCRATCH_SUFFIX: &str = ".TMP";

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether file logging is enabled. Defaults to `false`.
    pub enabled: bool,
    /// Minimum log level: "debug", "info", "warn", or "error".
    pub level: String,
    /// Log file or directory. `None` uses the config directory.
    pub file: Option<PathBuf>,
    /// Maximum log file size in megabytes before rotation.
    pub max_file_mb: u64,
    /// Number of rotated files kept next to the active one.
    pub max_backups: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".into(),
            file: None,
            max_file_mb: 10,
            max_backups: 4,
        }
    }
}

/// Parses a level name, defaulting to `Info`.
pub fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Installs the global logger. Call once at daemon startup.
///
/// Returns the log file in use, or `None` when logging goes to stderr
/// only. A second call leaves the first logger in place.
pub fn init(config: &LogConfig) -> Option<PathBuf> {
    let level = parse_level(&config.level);
    let file = if config.enabled {
        open_log_file(config)
    } else {
        None
    };
    let path = file.as_ref().map(|f| f.path.clone());

    let logger = LOGGER.get_or_init(|| Logger {
        level,
        file: Mutex::new(file),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
    path
}

fn open_log_file(config: &LogConfig) -> Option<RotatingFile> {
    let Some(path) = resolve_path(config.file.as_deref()) else {
        eprintln!("showallfiles: could not determine log directory, file logging disabled");
        return None;
    };
    if let Err(e) = check_writable(&path) {
        eprintln!(
            "showallfiles: cannot write log file {}: {e}, file logging disabled",
            path.display()
        );
        return None;
    }
    match RotatingFile::open(path.clone(), config.max_file_mb, config.max_backups) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("showallfiles: cannot open {}: {e}", path.display());
            None
        }
    }
}

/// Resolves the configured log location to a file path.
///
/// A directory (existing, or written with a trailing separator) gets
/// `showallfiles.log` appended. Nothing configured means
/// `~/.config/showallfiles/logs/showallfiles.log`.
pub fn resolve_path(configured: Option<&Path>) -> Option<PathBuf> {
    let Some(path) = configured else {
        return crate::config::config_dir().map(|d| d.join("logs").join(LOG_FILE_NAME));
    };
    let text = path.to_string_lossy();
    if path.is_dir() || text.ends_with('/') || text.ends_with('\\') {
        Some(path.join(LOG_FILE_NAME))
    } else {
        Some(path.to_path_buf())
    }
}

/// Checks that files can be created next to `path` by writing and
/// removing a scratch file named after it with `.TMP` appended.
pub fn check_writable(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let scratch = scratch_path(path);
    File::create(&scratch)?;
    fs::remove_file(&scratch)
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(SCRATCH_SUFFIX);
    PathBuf::from(name)
}

/// Formats one log line: `HH:MM:SS [LEVEL] message`.
///
/// Double quotes become single quotes so lines stay easy to grep.
pub fn format_line(time: &str, level: Level, message: &str) -> String {
    format!("{time} [{level}] {}\n", message.replace('"', "'"))
}

struct Logger {
    level: LevelFilter,
    file: Mutex<Option<RotatingFile>>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(&timestamp(), record.level(), &record.args().to_string());
        let _ = io::stderr().write_all(line.as_bytes());

        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Some(file) = file.as_mut() {
            let _ = file.write_line(&line);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock()
            && let Some(file) = file.as_mut()
        {
            let _ = file.file.flush();
        }
    }
}

/// An append-only file rotated by size.
pub(crate) struct RotatingFile {
    file: File,
    path: PathBuf,
    max_bytes: u64,
    max_backups: u32,
    written: u64,
}

impl RotatingFile {
    pub(crate) fn open(path: PathBuf, max_file_mb: u64, max_backups: u32) -> io::Result<Self> {
        Self::with_limit(path, max_file_mb.saturating_mul(1024 * 1024), max_backups)
    }

    pub(crate) fn with_limit(path: PathBuf, max_bytes: u64, max_backups: u32) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            file,
            path,
            max_bytes,
            max_backups,
            written,
        })
    }

    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.written += line.len() as u64;
        if self.max_bytes > 0 && self.written >= self.max_bytes {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if self.max_backups == 0 {
            self.file.set_len(0)?;
            self.written = 0;
            return Ok(());
        }
        let _ = fs::remove_file(backup_path(&self.path, self.max_backups));
        for n in (1..self.max_backups).rev() {
            let from = backup_path(&self.path, n);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, n + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

/// `showallfiles.log` becomes `showallfiles.log.<n>`.
pub(crate) fn backup_path(path: &Path, n: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

fn timestamp() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs();
    let (h, m, s) = (secs / 3600 % 24, secs / 60 % 60, secs % 60);
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
