use std::sync::mpsc;
use std::thread;

use showallfiles_core::Report;

use super::daemon_ipc;
use super::daemon_types::DaemonMsg;

/// Forwards one task's reports into the daemon channel.
///
/// Ends when the task drops its sender.
pub(super) fn spawn_report_bridge(
    reports: mpsc::Receiver<Report>,
    tx: mpsc::Sender<DaemonMsg>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for report in reports {
            if tx.send(DaemonMsg::Report(report)).is_err() {
                break;
            }
        }
    })
}

/// Turns Ctrl+C signals into [`DaemonMsg::Interrupt`].
///
/// Registration failure is logged; the daemon can still be stopped
/// over IPC.
pub(super) fn spawn_interrupt_bridge(tx: mpsc::Sender<DaemonMsg>) {
    let (ctrl_tx, ctrl_rx) = mpsc::channel::<()>();
    if let Err(e) = crate::ctrl_c::set_handler(ctrl_tx) {
        log::warn!("Ctrl+C handler not installed: {e}");
        return;
    }
    thread::spawn(move || {
        for () in ctrl_rx {
            if tx.send(DaemonMsg::Interrupt).is_err() {
                break;
            }
        }
    });
}

/// Spawns the IPC listener thread.
pub(super) fn spawn_ipc_listener(tx: mpsc::Sender<DaemonMsg>) -> thread::JoinHandle<()> {
    thread::spawn(move || daemon_ipc::ipc_loop(tx))
}
