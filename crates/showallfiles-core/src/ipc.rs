use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::status::VisibilityStatus;

/// The named pipe path used for IPC between CLI and daemon.
pub const PIPE_NAME: &str = r"\\.\pipe\showallfiles";

/// A command sent from the CLI to the daemon, one JSON object per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    /// Request the daemon to stop.
    Stop,
    /// Request the current hidden-files setting.
    Status,
    /// Flip the hidden-files setting, as if the hotkey had been pressed.
    Toggle,
}

/// A response sent from the daemon back to the CLI.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The hidden-files setting after the command ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityStatus>,
    /// The daemon's active log file, if file logging is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: None,
            visibility: None,
            log_file: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    /// A successful response carrying the current setting.
    pub fn with_visibility(visibility: VisibilityStatus) -> Self {
        Self {
            message: Some(format!("hidden files are {visibility}")),
            visibility: Some(visibility),
            ..Self::ok()
        }
    }

    pub fn with_log_file(self, log_file: Option<PathBuf>) -> Self {
        Self { log_file, ..self }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            visibility: None,
            log_file: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}
