//! Process-wide coordination state shared by every listener thread.
//!
//! One `RwLock` guards all entries. Reads run concurrently; writes are
//! exclusive. Entries are typed fields rather than a dynamic map, so a
//! lookup can never fail on a type mismatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::status::VisibilityStatus;

/// A live foreground event hook and the thread pumping its messages.
///
/// Stored as one value so a hook handle is never present without its
/// owning thread id, or the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookRegistration {
    /// Raw hook handle.
    pub hook: usize,
    /// OS thread id running the hook's message loop.
    pub thread_id: u32,
}

#[derive(Debug, Default)]
struct Entries {
    status: Option<VisibilityStatus>,
    hook: Option<HookRegistration>,
    dialogs: HashMap<String, bool>,
    log_file: Option<PathBuf>,
}

/// Shared coordination state.
///
/// Constructed once by the application shell and handed to every
/// component as `Arc<SharedState>`. The status entry is only written
/// by [`StatusAuthority`](crate::StatusAuthority) and the hook entry
/// only by [`FocusWatcher`](crate::FocusWatcher).
#[derive(Debug, Default)]
pub struct SharedState {
    entries: RwLock<Entries>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last published visibility status.
    pub fn status(&self) -> Option<VisibilityStatus> {
        self.read().status
    }

    pub(crate) fn set_status(&self, status: VisibilityStatus) {
        self.write().status = Some(status);
    }

    /// Returns the active hook registration, if the focus watcher is armed.
    pub fn hook(&self) -> Option<HookRegistration> {
        self.read().hook
    }

    pub(crate) fn set_hook(&self, registration: HookRegistration) {
        self.write().hook = Some(registration);
    }

    pub(crate) fn clear_hook(&self) {
        self.write().hook = None;
    }

    /// Marks the dialog with `title` as open.
    ///
    /// Returns `false` without changing anything if a dialog with the
    /// same title is already showing.
    pub fn open_dialog(&self, title: &str) -> bool {
        let mut entries = self.write();
        let open = entries.dialogs.entry(dialog_key(title)).or_insert(false);
        if *open {
            return false;
        }
        *open = true;
        true
    }

    /// Marks the dialog with `title` as closed.
    pub fn close_dialog(&self, title: &str) {
        self.write().dialogs.insert(dialog_key(title), false);
    }

    /// Returns the active log file, if file logging is enabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.read().log_file.clone()
    }

    pub fn set_log_file(&self, path: PathBuf) {
        self.write().log_file = Some(path);
    }

    /// Discards every entry. Called once at shutdown.
    pub fn clear(&self) {
        *self.write() = Entries::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Dialog titles are keyed without spaces and case.
fn dialog_key(title: &str) -> String {
    title.replace(' ', "").to_lowercase()
}
