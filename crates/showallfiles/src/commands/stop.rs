use showallfiles_core::{Command, pid};
use showallfiles_windows::{ipc, process};

pub fn execute() {
    if ipc::is_daemon_running() {
        match ipc::send_command(&Command::Stop) {
            Ok(response) if response.is_ok() => {
                println!("ShowAllFiles stopped.");
                let _ = pid::remove_pid_file();
                return;
            }
            Ok(response) => {
                eprintln!(
                    "Error: {}",
                    response.message.unwrap_or("unknown error".into())
                );
                std::process::exit(1);
            }
            Err(e) => eprintln!("IPC failed: {e}"),
        }
    }

    // The pipe is gone but the process may still be alive.
    match pid::read_pid_file() {
        Ok(Some(pid)) if process::is_process_alive(pid) => match process::kill_process(pid) {
            Ok(()) => {
                let _ = pid::remove_pid_file();
                println!("ShowAllFiles stopped (killed PID {pid}).");
            }
            Err(e) => {
                eprintln!("Failed to kill process {pid}: {e}");
                std::process::exit(1);
            }
        },
        _ => println!("ShowAllFiles is not running."),
    }
}
