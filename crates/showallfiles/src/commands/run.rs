use showallfiles_core::config::Overrides;

pub fn execute(overrides: &Overrides) {
    if showallfiles_windows::ipc::is_daemon_running() {
        eprintln!("ShowAllFiles is already running.");
        std::process::exit(1);
    }
    if let Err(e) = showallfiles_windows::daemon::run(overrides) {
        eprintln!("Daemon error: {e}");
        std::process::exit(1);
    }
}
