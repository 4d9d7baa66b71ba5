//! Ctrl+C handling through `SetConsoleCtrlHandler`.

use std::io;
use std::sync::OnceLock;
use std::sync::mpsc::Sender;

use showallfiles_core::Result;
use windows::Win32::System::Console::{
    CTRL_BREAK_EVENT, CTRL_C_EVENT, CTRL_CLOSE_EVENT, SetConsoleCtrlHandler,
};
use windows::core::BOOL;

/// Written once by `set_handler`, read by the callback.
static SENDER: OnceLock<Sender<()>> = OnceLock::new();

/// Sends `()` on `tx` for every Ctrl+C, Ctrl+Break or console close.
pub fn set_handler(tx: Sender<()>) -> Result<()> {
    SENDER
        .set(tx)
        .map_err(|_| io::Error::other("Ctrl+C handler already registered"))?;
    // SAFETY: handler matches PHANDLER_ROUTINE and only touches a static.
    unsafe { SetConsoleCtrlHandler(Some(handler), true) }.map_err(io::Error::from)?;
    Ok(())
}

unsafe extern "system" fn handler(ctrl_type: u32) -> BOOL {
    if matches!(ctrl_type, CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT)
        && let Some(tx) = SENDER.get()
    {
        let _ = tx.send(());
        return BOOL(1);
    }
    BOOL(0)
}
