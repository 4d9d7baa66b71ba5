use std::os::windows::process::CommandExt;
use std::process::{Command, Stdio};

use showallfiles_core::{config, pid};
use showallfiles_windows::{ipc, process};

use crate::DaemonArgs;

/// `CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP`: no console, and
/// Ctrl+C in the launching terminal does not reach the daemon.
const DETACH_FLAGS: u32 = 0x08000000 | 0x00000200;

pub fn execute(args: &DaemonArgs) {
    if ipc::is_daemon_running() {
        println!("ShowAllFiles is already running.");
        return;
    }

    if let Ok(Some(pid)) = pid::read_pid_file() {
        if process::is_process_alive(pid) {
            println!("ShowAllFiles process exists (PID: {pid}) but is not responding.");
            return;
        }
        let _ = pid::remove_pid_file();
    }

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            eprintln!("Error: could not locate the showallfiles executable: {e}");
            std::process::exit(1);
        }
    };

    let spawned = Command::new(exe)
        .arg("run")
        .args(args.to_args())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(DETACH_FLAGS)
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            eprintln!("Error: failed to start daemon: {e}");
            std::process::exit(1);
        }
    };
    let pid = child.id();
    let _ = child.try_wait();

    print_banner(pid);
}

fn print_banner(pid: u32) {
    let d = "\x1b[90m"; // Dim gray, labels
    let w = "\x1b[1;97m"; // Bold bright white, values
    let r = "\x1b[0m";
    let config = config::load();

    super::banner::print_logo();
    println!();
    println!("  {d}Config{r}   ~/.config/showallfiles/");
    println!("  {d}Daemon{r}   Started (PID: {w}{pid}{r})");
    println!("  {d}Hotkey{r}   {w}{}{r}", config.hotkey);
    println!();
}
