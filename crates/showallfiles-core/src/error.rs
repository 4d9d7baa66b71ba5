use thiserror::Error;

use crate::task::TaskKind;

/// Errors raised by the coordination core and its platform backends.
///
/// Platform crates convert OS error codes into the matching variant at
/// the call site, keeping the OS message as text.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing registry key could not be opened.
    #[error("could not open key {path:?}: {reason}")]
    BackingStoreUnavailable { path: String, reason: String },

    /// The integer value could not be read from the open key.
    #[error("could not read value {name:?}: {reason}")]
    ValueReadFailure { name: String, reason: String },

    /// The integer value could not be written to the open key.
    #[error("could not write value {name:?}: {reason}")]
    ValueWriteFailure { name: String, reason: String },

    /// Registering for change notification on the key failed.
    #[error("change notification setup failed: {0}")]
    NotificationSetupFailure(String),

    /// Waiting for a change notification failed.
    #[error("waiting for change notification failed: {0}")]
    NotificationWaitFailure(String),

    /// The foreground event hook could not be installed.
    #[error("could not install foreground event hook: {0}")]
    HookInstallFailure(String),

    /// Retrieving messages for the hook thread failed.
    #[error("message loop failed: {0}")]
    MessageLoopFailure(String),

    /// Listing the top-level windows failed.
    #[error("window enumeration failed: {0}")]
    EnumerationFailure(String),

    /// The global hotkey could not be registered.
    #[error("could not register hotkey {hotkey}: {reason}")]
    HotkeyRegistrationFailure { hotkey: String, reason: String },

    /// Posting the refresh command to a window failed.
    #[error("could not post refresh to window 0x{window:X}: {reason}")]
    RefreshPostFailure { window: usize, reason: String },

    /// A task thread panicked before it could report a result.
    #[error("{0} task panicked")]
    TaskPanicked(TaskKind),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Ipc(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
