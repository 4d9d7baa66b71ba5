//! Out-of-context WinEvent hook for `EVENT_SYSTEM_FOREGROUND`.
//!
//! The callback runs on the thread that installed the hook, inside its
//! message loop. It only forwards the window handle through a
//! thread-local sender; all decisions happen on the receiving side.

use std::cell::RefCell;
use std::sync::mpsc::Sender;

use showallfiles_core::{Error, ForegroundHook, HookRegistration, Result, WindowHandle};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, EVENT_SYSTEM_FOREGROUND, GetMessageW, MSG, PostThreadMessageW,
    TranslateMessage, WINEVENT_OUTOFCONTEXT, WM_QUIT,
};

/// Object ID of the window itself rather than one of its children.
const OBJID_WINDOW: i32 = 0;

thread_local! {
    static EVENT_SENDER: RefCell<Option<Sender<WindowHandle>>> = const { RefCell::new(None) };
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WinEventHook;

impl ForegroundHook for WinEventHook {
    fn install(&self, events: Sender<WindowHandle>) -> Result<HookRegistration> {
        EVENT_SENDER.with(|cell| *cell.borrow_mut() = Some(events));

        // SAFETY: out-of-context hooks call back on this thread while it
        // pumps messages; win_event_proc matches WINEVENTPROC.
        let hook = unsafe {
            SetWinEventHook(
                EVENT_SYSTEM_FOREGROUND,
                EVENT_SYSTEM_FOREGROUND,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT,
            )
        };
        if hook.is_invalid() {
            EVENT_SENDER.with(|cell| cell.borrow_mut().take());
            return Err(Error::HookInstallFailure(
                windows::core::Error::from_win32().message(),
            ));
        }

        // SAFETY: always safe to call.
        let thread_id = unsafe { GetCurrentThreadId() };
        Ok(HookRegistration {
            hook: hook.0 as usize,
            thread_id,
        })
    }

    fn pump(&self) -> Result<()> {
        let mut msg = MSG::default();
        loop {
            // SAFETY: msg is a valid out pointer; None reads every
            // message for this thread.
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => return Ok(()),
                -1 => {
                    return Err(Error::MessageLoopFailure(
                        windows::core::Error::from_win32().message(),
                    ));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }

    fn uninstall(&self, registration: HookRegistration) {
        // SAFETY: the handle came from SetWinEventHook on this thread.
        let removed = unsafe { UnhookWinEvent(HWINEVENTHOOK(registration.hook as *mut _)) };
        if !removed.as_bool() {
            log::warn!("UnhookWinEvent failed for hook 0x{:X}", registration.hook);
        }
        EVENT_SENDER.with(|cell| cell.borrow_mut().take());
    }

    fn post_quit(&self, thread_id: u32) -> Result<()> {
        // SAFETY: posting to a thread that has exited fails harmlessly.
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            .map_err(|e| Error::MessageLoopFailure(e.message()))
    }
}

/// The WinEvent callback.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    _id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    if event != EVENT_SYSTEM_FOREGROUND || id_object != OBJID_WINDOW || hwnd.is_invalid() {
        return;
    }
    EVENT_SENDER.with(|cell| {
        if let Some(sender) = cell.borrow().as_ref() {
            let _ = sender.send(WindowHandle(hwnd.0 as usize));
        }
    });
}
