use std::sync::mpsc;

use showallfiles_core::ipc::{Command, Response};

use crate::ipc::PipeServer;

use super::daemon_types::{DaemonMsg, ResponseSender};

/// Accepts IPC connections in a loop and forwards commands to the
/// main daemon thread. Returns after relaying a `Stop`.
pub(super) fn ipc_loop(tx: mpsc::Sender<DaemonMsg>) {
    loop {
        let server = match PipeServer::create() {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to create pipe: {e}");
                return;
            }
        };

        let command = match server.accept_command() {
            Ok(cmd) => cmd,
            Err(e) => {
                log::warn!("Error reading command: {e}");
                let _ = server.send_response(&Response::error(e.to_string()));
                continue;
            }
        };
        log::debug!("IPC command: {command:?}");

        let (reply_tx, reply_rx): (ResponseSender, _) = mpsc::channel();
        if tx.send(DaemonMsg::Command(command, reply_tx)).is_err() {
            return;
        }

        if let Ok(response) = reply_rx.recv()
            && let Err(e) = server.send_response(&response)
        {
            log::warn!("Error sending response: {e}");
        }

        if command == Command::Stop {
            return;
        }
    }
}
