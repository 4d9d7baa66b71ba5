//! Message boxes, at most one open per title.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use showallfiles_core::SharedState;
use windows::Win32::UI::WindowsAndMessaging::{MB_APPLMODAL, MB_ICONERROR, MB_OK, MessageBoxW};
use windows::core::HSTRING;

pub const FATAL_TITLE: &str = "Fatal Error";

/// Shows an error message box on its own thread.
///
/// Returns `None` without showing anything if a box with the same
/// title is already open.
pub fn show(state: &Arc<SharedState>, title: &str, text: &str) -> Option<JoinHandle<()>> {
    if !state.open_dialog(title) {
        log::debug!("Message box {title:?} is already open");
        return None;
    }
    let shared = state.clone();
    let (owned_title, text) = (title.to_owned(), text.to_owned());
    let spawned = thread::Builder::new()
        .name("dialog".into())
        .spawn(move || {
            message_box(&owned_title, &text);
            shared.close_dialog(&owned_title);
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("Could not show message box: {e}");
            state.close_dialog(title);
            None
        }
    }
}

/// Shows a fatal error and blocks until it is dismissed.
///
/// The caller exits afterwards.
pub fn fatal(state: &SharedState, text: &str) {
    log::error!("{text}");
    if !state.open_dialog(FATAL_TITLE) {
        return;
    }
    message_box(FATAL_TITLE, text);
    state.close_dialog(FATAL_TITLE);
}

fn message_box(title: &str, text: &str) {
    // SAFETY: both strings outlive the modal call.
    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(text),
            &HSTRING::from(title),
            MB_APPLMODAL | MB_OK | MB_ICONERROR,
        );
    }
}
