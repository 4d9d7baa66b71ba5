//! `RegNotifyChangeKeyValue` wrapped as a cancellable [`KeyWatch`].
//!
//! The watch owns two events: one signalled by the registry when the
//! key changes and a manual-reset stop event. `wait` blocks on both, so
//! setting the stop event ends the watch without polling.

use std::sync::Arc;

use showallfiles_core::{Cancel, Error, KeyWatch, Result, Wake};
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_EVENT, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows::Win32::System::Registry::{REG_NOTIFY_CHANGE_LAST_SET, RegNotifyChangeKeyValue};
use windows::Win32::System::Threading::{CreateEventW, INFINITE, SetEvent, WaitForMultipleObjects};
use windows::core::PCWSTR;

use crate::registry::RegistryKey;

/// An owned Win32 event object.
struct Event(HANDLE);

// SAFETY: event handles may be signalled and waited on from any thread.
unsafe impl Send for Event {}
unsafe impl Sync for Event {}

impl Event {
    fn new(manual_reset: bool) -> Result<Self> {
        // SAFETY: unnamed event with default security. The handle is
        // closed by Drop.
        unsafe { CreateEventW(None, manual_reset, false, PCWSTR::null()) }
            .map(Self)
            .map_err(|e| Error::NotificationSetupFailure(format!("CreateEventW: {e}")))
    }
}

impl Drop for Event {
    fn drop(&mut self) {
        // SAFETY: the handle is owned and closed exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Watches the Explorer settings key and its subkeys for value writes.
pub struct RegistryKeyWatch {
    key: RegistryKey,
    changed: Event,
    stop: Arc<Event>,
}

impl RegistryKeyWatch {
    /// Opens the key and creates both events.
    ///
    /// Returns the watch together with the handle that cancels it.
    pub fn new() -> Result<(Self, StopEvent)> {
        let key = RegistryKey::open_for_notify()
            .map_err(|e| Error::NotificationSetupFailure(e.to_string()))?;
        let changed = Event::new(false)?;
        let stop = Arc::new(Event::new(true)?);
        let cancel = StopEvent(stop.clone());
        Ok((Self { key, changed, stop }, cancel))
    }
}

impl KeyWatch for RegistryKeyWatch {
    fn arm(&mut self) -> Result<()> {
        // SAFETY: key and event are valid for the lifetime of `self`.
        // Asynchronous mode returns immediately and signals `changed`.
        let status = unsafe {
            RegNotifyChangeKeyValue(
                self.key.raw(),
                true,
                REG_NOTIFY_CHANGE_LAST_SET,
                Some(self.changed.0),
                true,
            )
        };
        if status.is_err() {
            let reason = windows::core::Error::from(status.to_hresult()).message();
            return Err(Error::NotificationSetupFailure(format!(
                "RegNotifyChangeKeyValue: {reason}"
            )));
        }
        Ok(())
    }

    fn wait(&mut self) -> Result<Wake> {
        let handles = [self.changed.0, self.stop.0];
        // SAFETY: both handles are owned by `self` and outlive the wait.
        let result = unsafe { WaitForMultipleObjects(&handles, false, INFINITE) };
        if result == WAIT_OBJECT_0 {
            Ok(Wake::Changed)
        } else if result == WAIT_EVENT(WAIT_OBJECT_0.0 + 1) {
            Ok(Wake::Cancelled)
        } else if result == WAIT_TIMEOUT {
            Ok(Wake::Spurious)
        } else {
            // WAIT_FAILED would fail again on every retry.
            Err(Error::NotificationWaitFailure(format!(
                "WaitForMultipleObjects: {}",
                windows::core::Error::from_win32().message()
            )))
        }
    }
}

/// Cancels a [`RegistryKeyWatch`] by setting its stop event.
pub struct StopEvent(Arc<Event>);

impl Cancel for StopEvent {
    fn cancel(&self) {
        // SAFETY: the event stays alive while this Arc is held.
        if let Err(e) = unsafe { SetEvent(self.0.0) } {
            log::warn!("Could not signal registry watch stop: {e}");
        }
    }
}
