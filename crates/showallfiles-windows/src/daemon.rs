use std::sync::Arc;

use showallfiles_core::config::{self, Overrides};
use showallfiles_core::{Error, ExplorerIdentity, Result, SharedState, logging, pid};

use crate::dialog;

#[path = "daemon_ipc.rs"]
mod daemon_ipc;
#[path = "daemon_loop.rs"]
mod daemon_loop;
#[path = "daemon_threads.rs"]
mod daemon_threads;
#[path = "daemon_types.rs"]
mod daemon_types;

/// Runs the ShowAllFiles daemon until stopped over IPC or by Ctrl+C.
///
/// Startup failures that leave the daemon useless are shown in a
/// "Fatal Error" message box and returned.
pub fn run(overrides: &Overrides) -> Result<()> {
    let mut config = config::load();
    config.apply(overrides);

    let state = Arc::new(SharedState::new());
    if let Some(path) = logging::init(&config.logging) {
        state.set_log_file(path);
    }
    log::info!("Daemon started (PID: {})", std::process::id());
    log::debug!(
        "Config: hotkey={}, settle_delay_ms={}, log_level={}",
        config.hotkey,
        config.refresh.settle_delay_ms,
        config.logging.level
    );

    let Some(identity) = ExplorerIdentity::from_env() else {
        let msg = "Environment variable 'SystemRoot' not set";
        dialog::fatal(&state, msg);
        return Err(Error::Config(msg.into()));
    };
    log::debug!("Explorer image is {}", identity.expected_image());

    pid::write_pid_file()?;
    let result = daemon_loop::daemon_loop(&config, &state, Arc::new(identity));
    let _ = pid::remove_pid_file();

    state.clear();
    log::info!("Daemon stopped");
    result
}
