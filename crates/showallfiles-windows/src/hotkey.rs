use showallfiles_core::{Cancel, Error, Hotkey, HotkeyBackend, Modifier, Result};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT, MOD_SHIFT, MOD_WIN, RegisterHotKey,
    UnregisterHotKey,
};
use windows::Win32::UI::WindowsAndMessaging::{GetMessageW, MSG, PostThreadMessageW, WM_HOTKEY, WM_QUIT};

use crate::keys;

/// Identifier of the single registered hotkey.
const HOTKEY_ID: i32 = 1;

/// Global hotkey registered on the listener thread's message queue.
///
/// `WM_HOTKEY` is delivered to that queue; `wait_press` pumps it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Hotkeys;

impl HotkeyBackend for Win32Hotkeys {
    fn register(&self, hotkey: &Hotkey) -> Result<Box<dyn Cancel>> {
        let failure = |reason: String| Error::HotkeyRegistrationFailure {
            hotkey: hotkey.to_string(),
            reason,
        };

        let vk = keys::vk_from_name(&hotkey.key)
            .ok_or_else(|| failure(format!("unknown key name {:?}", hotkey.key)))?;
        let modifiers = hotkey
            .modifiers
            .iter()
            .fold(MOD_NOREPEAT, |flags, m| flags | modifier_to_flag(*m));

        // SAFETY: registers on the calling thread's queue, which the
        // call creates if needed.
        unsafe { RegisterHotKey(None, HOTKEY_ID, modifiers, vk) }
            .map_err(|e| failure(e.message()))?;

        // SAFETY: always safe to call.
        let thread_id = unsafe { GetCurrentThreadId() };
        Ok(Box::new(ThreadQuit(thread_id)))
    }

    fn wait_press(&self) -> bool {
        let mut msg = MSG::default();
        loop {
            // SAFETY: msg is a valid out pointer.
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => return false,
                -1 => {
                    log::error!(
                        "Hotkey message loop failed: {}",
                        windows::core::Error::from_win32().message()
                    );
                    return false;
                }
                _ if msg.message == WM_HOTKEY && msg.wParam.0 == HOTKEY_ID as usize => {
                    return true;
                }
                _ => {}
            }
        }
    }

    fn unregister(&self, hotkey: &Hotkey) {
        // SAFETY: removes the registration made by this thread.
        if unsafe { UnregisterHotKey(None, HOTKEY_ID) }.is_err() {
            log::warn!("Could not unregister {hotkey}");
        }
    }
}

/// Ends a thread's message loop by posting `WM_QUIT` to it.
pub struct ThreadQuit(pub u32);

impl Cancel for ThreadQuit {
    fn cancel(&self) {
        // SAFETY: posting to an exited thread fails harmlessly.
        if let Err(e) = unsafe { PostThreadMessageW(self.0, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            log::debug!("Could not post quit to thread {}: {}", self.0, e.message());
        }
    }
}

fn modifier_to_flag(modifier: Modifier) -> HOT_KEY_MODIFIERS {
    match modifier {
        Modifier::Alt => MOD_ALT,
        Modifier::Shift => MOD_SHIFT,
        Modifier::Ctrl => MOD_CONTROL,
        Modifier::Win => MOD_WIN,
    }
}
