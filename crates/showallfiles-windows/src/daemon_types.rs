use std::sync::mpsc;

use showallfiles_core::Report;
use showallfiles_core::ipc::{Command, Response};

/// Internal message type for the main daemon thread.
pub(super) enum DaemonMsg {
    /// A status change or failure from one of the listener tasks.
    Report(Report),
    /// A CLI command with a callback to send the response.
    Command(Command, ResponseSender),
    /// Ctrl+C or console close.
    Interrupt,
}

/// Sends a response back to the IPC thread for the connected client.
pub(super) type ResponseSender = mpsc::Sender<Response>;
