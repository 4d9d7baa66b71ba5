use std::sync::Arc;

use showallfiles_core::{
    Command, ExplorerIdentity, SharedState, StatusAuthority, refresh_open_windows,
};
use showallfiles_windows::{RegistryStore, Win32Desktop, ipc};

pub fn execute() {
    if ipc::is_daemon_running() {
        match ipc::send_command(&Command::Toggle) {
            Ok(response) if response.is_ok() => {
                println!("{}.", response.message.unwrap_or_default());
            }
            Ok(response) => {
                eprintln!(
                    "Error: {}",
                    response.message.unwrap_or("unknown error".into())
                );
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("IPC failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = toggle_directly() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Toggles without a daemon, then refreshes open Explorer windows once.
///
/// Nobody stays behind to watch for a window opened later, so no focus
/// watcher is armed when none is open.
fn toggle_directly() -> showallfiles_core::Result<()> {
    let Some(identity) = ExplorerIdentity::from_env() else {
        return Err(showallfiles_core::Error::Config(
            "environment variable 'SystemRoot' not set".into(),
        ));
    };
    let authority = StatusAuthority::new(Arc::new(RegistryStore), Arc::new(SharedState::new()));

    let status = authority.toggle()?;
    println!("hidden files are {status}.");

    let refreshed = refresh_open_windows(&Win32Desktop, &identity)?;
    log::debug!("Refreshed {refreshed} Explorer windows");
    Ok(())
}
