use showallfiles_core::{Command, SharedState, StatusAuthority, pid};
use showallfiles_windows::{RegistryStore, ipc, process};

pub fn execute() {
    if ipc::is_daemon_running() {
        match ipc::send_command(&Command::Status) {
            Ok(response) if response.is_ok() => {
                println!("ShowAllFiles is running.");
                if let Some(message) = response.message {
                    println!("{message}.");
                }
                if let Some(path) = response.log_file {
                    println!("Logging to {}", path.display());
                }
                return;
            }
            Ok(response) => eprintln!(
                "Error: {}",
                response.message.unwrap_or("unknown error".into())
            ),
            Err(e) => eprintln!("IPC failed: {e}"),
        }
    } else if let Ok(Some(pid)) = pid::read_pid_file() {
        if process::is_process_alive(pid) {
            println!("ShowAllFiles process exists (PID: {pid}) but is not responding.");
        } else {
            let _ = pid::remove_pid_file();
            println!("ShowAllFiles is not running (cleaned up stale PID file).");
        }
    } else {
        println!("ShowAllFiles is not running.");
    }

    // Without the daemon, read the setting directly.
    let authority = StatusAuthority::new(
        std::sync::Arc::new(RegistryStore),
        std::sync::Arc::new(SharedState::new()),
    );
    match authority.read() {
        Ok(status) => println!("hidden files are {status}."),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
