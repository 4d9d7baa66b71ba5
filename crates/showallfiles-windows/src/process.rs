use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE, TerminateProcess,
};

/// Checks whether a process with the given PID is still alive.
///
/// Used to detect stale PID files left by a daemon that was killed.
pub fn is_process_alive(pid: u32) -> bool {
    // SAFETY: the handle is only used to confirm existence and is
    // closed immediately.
    match unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) } {
        Ok(handle) => {
            unsafe {
                let _ = CloseHandle(handle);
            }
            true
        }
        Err(_) => false,
    }
}

/// Forcibly terminates a process. Last resort for `showallfiles stop`.
pub fn kill_process(pid: u32) -> showallfiles_core::Result<()> {
    // SAFETY: the handle is closed after use on every path.
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, false, pid)
            .map_err(std::io::Error::from)?;
        let result = TerminateProcess(handle, 1);
        let _ = CloseHandle(handle);
        result.map_err(std::io::Error::from)?;
    }
    Ok(())
}
