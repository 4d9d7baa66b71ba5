use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use showallfiles_core::ipc::{Command, Response};
use showallfiles_core::{
    Cancel, Config, Desktop, ExplorerIdentity, FocusWatcher, HotkeyListener, KeyWatch,
    RefreshBroadcaster, RegistryWatcher, Report, Result, SharedState, StatusAuthority, Task,
    TaskKind, VisibilityStatus,
};

use crate::dialog;
use crate::{RegistryKeyWatch, RegistryStore, Win32Desktop, Win32Hotkeys, WinEventHook};

use super::daemon_threads;
use super::daemon_types::DaemonMsg;

/// Starts every listener, runs the main loop and tears everything down.
pub(super) fn daemon_loop(
    config: &Config,
    state: &Arc<SharedState>,
    identity: Arc<ExplorerIdentity>,
) -> Result<()> {
    let authority = Arc::new(StatusAuthority::new(
        Arc::new(RegistryStore),
        state.clone(),
    ));
    let status = match authority.sync() {
        Ok(status) => status,
        Err(e) => {
            dialog::fatal(
                state,
                &format!("Error fetching value of 'Hidden' during startup: {e}"),
            );
            return Err(e);
        }
    };
    log_status(status);

    let (tx, rx) = mpsc::channel::<DaemonMsg>();

    let desktop: Arc<dyn Desktop> = Arc::new(Win32Desktop);
    let (focus_tx, focus_rx) = mpsc::channel();
    let focus = Arc::new(FocusWatcher::new(
        Arc::new(WinEventHook),
        desktop.clone(),
        identity.clone(),
        state.clone(),
        Duration::from_millis(config.refresh.settle_delay_ms),
        focus_tx,
    ));
    let broadcaster = Arc::new(RefreshBroadcaster::new(desktop, identity, focus.clone()));
    let focus_bridge = daemon_threads::spawn_report_bridge(focus_rx, tx.clone());

    let (hotkey_tx, hotkey_rx) = mpsc::channel();
    let hotkey = match HotkeyListener::spawn(
        Arc::new(Win32Hotkeys),
        config.hotkey.clone(),
        authority.clone(),
        hotkey_tx,
    ) {
        Ok(task) => task,
        Err(e) => {
            dialog::fatal(state, &format!("Error registering global hotkey: {e}"));
            return Err(e);
        }
    };
    let hotkey_bridge = daemon_threads::spawn_report_bridge(hotkey_rx, tx.clone());

    let (watch_tx, watch_rx) = mpsc::channel();
    let watcher = RegistryWatcher::start(
        || {
            let (watch, stop) = RegistryKeyWatch::new()?;
            Ok((Box::new(watch) as Box<dyn KeyWatch>, Box::new(stop) as Box<dyn Cancel>))
        },
        authority.clone(),
        broadcaster.clone(),
        watch_tx,
    );
    let watch_bridge = daemon_threads::spawn_report_bridge(watch_rx, tx.clone());

    let ipc_thread = daemon_threads::spawn_ipc_listener(tx.clone());
    daemon_threads::spawn_interrupt_bridge(tx.clone());
    drop(tx);

    let mut stopped_over_ipc = false;
    while let Ok(msg) = rx.recv() {
        match msg {
            DaemonMsg::Report(Report::StatusChanged(status)) => log_status(status),
            DaemonMsg::Report(Report::Failed(failure)) => {
                log::error!("{failure}");
                // Without the watcher, edits made outside ShowAllFiles go unnoticed.
                if failure.task == TaskKind::RegistryWatch {
                    dialog::show(state, "Error", &failure.to_string());
                }
            }
            DaemonMsg::Command(command, reply_tx) => {
                let _ = reply_tx.send(handle_command(command, &authority, state));
                if command == Command::Stop {
                    stopped_over_ipc = true;
                    break;
                }
            }
            DaemonMsg::Interrupt => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    stop_task(hotkey);
    if let Some(watcher) = watcher {
        stop_task(watcher);
    }
    focus.disarm();
    drop(broadcaster);
    drop(focus);

    let _ = hotkey_bridge.join();
    let _ = watch_bridge.join();
    let _ = focus_bridge.join();
    // The listener is blocked in ConnectNamedPipe unless it relayed Stop.
    if stopped_over_ipc {
        let _ = ipc_thread.join();
    }

    Ok(())
}

fn handle_command(
    command: Command,
    authority: &StatusAuthority,
    state: &SharedState,
) -> Response {
    match command {
        Command::Stop => Response::ok_with_message("Daemon stopping"),
        Command::Status => match authority.current() {
            Ok(status) => Response::with_visibility(status).with_log_file(state.log_file()),
            Err(e) => Response::error(e.to_string()),
        },
        Command::Toggle => {
            log::debug!("Toggle requested over IPC");
            match authority.toggle() {
                Ok(status) => Response::with_visibility(status),
                Err(e) => Response::error(e.to_string()),
            }
        }
    }
}

fn stop_task(task: Task) {
    let kind = task.kind();
    if let Err(e) = task.stop() {
        log::warn!("{kind} task ended with error: {e}");
    }
}

fn log_status(status: VisibilityStatus) {
    log::info!(
        "Hidden files are {status} (toggle: '{}', tooltip: 'ShowAllFiles - {}')",
        status.toggle_label(),
        status.describe()
    );
}
