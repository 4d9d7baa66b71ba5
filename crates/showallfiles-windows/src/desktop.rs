use showallfiles_core::desktop::REFRESH_COMMAND;
use showallfiles_core::{Desktop, Error, Result, WindowHandle};
use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM, WPARAM};
use windows::Win32::System::ProcessStatus::K32GetModuleFileNameExW;
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetWindowThreadProcessId, PostMessageW, WM_COMMAND,
};
use windows::core::BOOL;

/// The interactive desktop, queried through user32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Desktop;

impl Desktop for Win32Desktop {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>> {
        let mut windows: Vec<WindowHandle> = Vec::new();

        // SAFETY: EnumWindows runs synchronously, so the Vec passed as
        // LPARAM outlives every callback invocation.
        unsafe {
            EnumWindows(
                Some(enum_window_callback),
                LPARAM(&mut windows as *mut _ as isize),
            )
        }
        .map_err(|e| Error::EnumerationFailure(e.message()))?;

        Ok(windows)
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        // 256 is the maximum class name length in Win32.
        let mut buffer = [0u16; 256];
        // SAFETY: GetClassNameW writes at most buffer.len() characters.
        let length = unsafe { GetClassNameW(hwnd(window), &mut buffer) };
        if length <= 0 {
            log::debug!("Could not get class name of window 0x{:X}", window.0);
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..length as usize]))
    }

    fn process_image(&self, window: WindowHandle) -> Option<String> {
        let mut pid = 0u32;
        // SAFETY: pid is a valid out pointer.
        unsafe { GetWindowThreadProcessId(hwnd(window), Some(&mut pid)) };
        if pid == 0 {
            return None;
        }
        exe_path(pid)
    }

    fn post_refresh(&self, window: WindowHandle) -> Result<()> {
        // SAFETY: PostMessageW only queues the message; a stale handle
        // makes it fail rather than misbehave.
        unsafe {
            PostMessageW(
                Some(hwnd(window)),
                WM_COMMAND,
                WPARAM(REFRESH_COMMAND),
                LPARAM(0),
            )
        }
        .map_err(|e| Error::RefreshPostFailure {
            window: window.0,
            reason: e.message(),
        })
    }
}

/// Callback invoked by `EnumWindows` for each top-level window.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer passed by top_level_windows.
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    windows.push(WindowHandle(hwnd.0 as usize));
    BOOL(1)
}

/// Returns the executable path for a process ID.
fn exe_path(pid: u32) -> Option<String> {
    // SAFETY: the process handle is closed before returning and the
    // buffer length bounds the write.
    unsafe {
        let process = match OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not open process {pid}: {}", e.message());
                return None;
            }
        };
        let mut buffer = [0u16; 1024];
        let length = K32GetModuleFileNameExW(Some(process), None, &mut buffer);
        let _ = CloseHandle(process);
        if length == 0 {
            return None;
        }
        String::from_utf16(&buffer[..length as usize]).ok()
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut _)
}
