//! The global key combination that toggles hidden files.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::authority::StatusAuthority;
use crate::task::{Cancel, Report, Task, TaskKind};
use crate::{Error, Result};

/// Keyboard modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Alt,
    Shift,
    Ctrl,
    Win,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Ctrl => "Ctrl",
            Self::Win => "Win",
        };
        f.write_str(name)
    }
}

/// A key combination such as Win+Shift+Period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkey {
    /// Key name (e.g. "Period", "H", "F8").
    pub key: String,
    /// Modifier keys (e.g. ["win", "shift"]).
    pub modifiers: Vec<Modifier>,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self {
            key: "Period".into(),
            modifiers: vec![Modifier::Win, Modifier::Shift],
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{m}+")?;
        }
        f.write_str(&self.key)
    }
}

/// A platform's global hotkey facility.
///
/// `register`, `wait_press` and `unregister` are called on the
/// listener thread, in that order.
pub trait HotkeyBackend: Send + Sync {
    /// Registers `hotkey` for the calling thread.
    ///
    /// Returns a handle that makes a blocked `wait_press` return `false`.
    fn register(&self, hotkey: &Hotkey) -> Result<Box<dyn Cancel>>;

    /// Blocks until the hotkey is pressed (`true`) or cancelled (`false`).
    fn wait_press(&self) -> bool;

    fn unregister(&self, hotkey: &Hotkey);
}

pub struct HotkeyListener;

impl HotkeyListener {
    /// Registers the hotkey and starts listening on a new thread.
    ///
    /// Returns only after registration finished. A registration failure
    /// is returned to the caller, which treats it as fatal. Toggle
    /// failures while listening are logged and the loop continues.
    pub fn spawn(
        backend: Arc<dyn HotkeyBackend>,
        hotkey: Hotkey,
        authority: Arc<StatusAuthority>,
        reports: Sender<Report>,
    ) -> Result<Task> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Box<dyn Cancel>>>();

        let handle = thread::Builder::new()
            .name("hotkey".into())
            .spawn(move || {
                let cancel = match backend.register(&hotkey) {
                    Ok(cancel) => cancel,
                    Err(e) => {
                        let reason = e.to_string();
                        let _ = ready_tx.send(Err(e));
                        return Err(Error::HotkeyRegistrationFailure {
                            hotkey: hotkey.to_string(),
                            reason,
                        });
                    }
                };
                let _ = ready_tx.send(Ok(cancel));
                log::info!("Listening for {hotkey}");

                while backend.wait_press() {
                    log::debug!("Hotkey activated");
                    match authority.toggle() {
                        Ok(status) => {
                            let _ = reports.send(Report::StatusChanged(status));
                        }
                        Err(e) => log::error!("Toggle failed: {e}"),
                    }
                }

                backend.unregister(&hotkey);
                Ok(())
            })
            .map_err(|e| Error::HotkeyRegistrationFailure {
                hotkey: String::from("<listener thread>"),
                reason: e.to_string(),
            })?;

        match ready_rx.recv() {
            Ok(Ok(cancel)) => Ok(Task::new(TaskKind::Hotkey, cancel, handle)),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => match handle.join() {
                Ok(Err(e)) => Err(e),
                _ => Err(Error::TaskPanicked(TaskKind::Hotkey)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fakes::{FakeHotkeys, FakeStore, wait_until};
    use crate::state::SharedState;
    use crate::status::VisibilityStatus;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn authority(store: &Arc<FakeStore>) -> Arc<StatusAuthority> {
        let authority = StatusAuthority::new(store.clone(), Arc::new(SharedState::new()));
        authority.sync().unwrap();
        Arc::new(authority)
    }

    #[test]
    fn default_is_win_shift_period() {
        assert_eq!(Hotkey::default().to_string(), "Win+Shift+Period");
    }

    #[test]
    fn deserializes_lowercase_modifiers() {
        let hotkey: Hotkey = toml::from_str("key = \"H\"\nmodifiers = [\"ctrl\", \"alt\"]").unwrap();

        assert_eq!(hotkey.key, "H");
        assert_eq!(hotkey.modifiers, vec![Modifier::Ctrl, Modifier::Alt]);
    }

    #[test]
    fn press_toggles_status() {
        // Arrange
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);
        let backend = Arc::new(FakeHotkeys::new());
        let (tx, rx) = mpsc::channel();
        let task =
            HotkeyListener::spawn(backend.clone(), Hotkey::default(), authority.clone(), tx)
                .unwrap();

        // Act
        backend.press();

        // Assert
        let report = rx.recv_timeout(TIMEOUT).unwrap();
        assert!(matches!(
            report,
            Report::StatusChanged(VisibilityStatus::Hidden)
        ));
        assert_eq!(store.value(), 2);

        backend.press();
        rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(store.value(), 1);

        task.stop().unwrap();
        assert!(backend.unregistered());
    }

    #[test]
    fn toggle_failure_keeps_listening() {
        let store = Arc::new(FakeStore::new(1));
        let authority = authority(&store);
        let backend = Arc::new(FakeHotkeys::new());
        let (tx, rx) = mpsc::channel();
        let task =
            HotkeyListener::spawn(backend.clone(), Hotkey::default(), authority.clone(), tx)
                .unwrap();

        store.fail_write(true);
        backend.press();
        assert!(wait_until(|| backend.pending() == 0));
        assert!(!task.is_finished());

        store.fail_write(false);
        backend.press();
        assert!(matches!(
            rx.recv_timeout(TIMEOUT).unwrap(),
            Report::StatusChanged(VisibilityStatus::Hidden)
        ));

        task.stop().unwrap();
    }

    #[test]
    fn registration_failure_is_returned_to_caller() {
        let store = Arc::new(FakeStore::new(1));
        let backend = Arc::new(FakeHotkeys::new());
        backend.fail_register(true);
        let (tx, _rx) = mpsc::channel();

        let err = HotkeyListener::spawn(backend, Hotkey::default(), authority(&store), tx)
            .unwrap_err();

        assert!(matches!(err, Error::HotkeyRegistrationFailure { .. }));
    }
}
