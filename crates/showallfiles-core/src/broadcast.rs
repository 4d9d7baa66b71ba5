use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;
use crate::desktop::{Desktop, ExplorerIdentity};
use crate::focus::FocusWatcher;

/// Result of one refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshOutcome {
    /// Explorer windows that were sent the refresh command.
    pub refreshed: usize,
    /// Whether this pass armed the focus watcher.
    pub armed: bool,
}

/// Refreshes every open Explorer window.
///
/// When none is open, arms the [`FocusWatcher`] so the next Explorer
/// window to take focus is refreshed instead. Passes are serialized:
/// two overlapping "nothing found, arm" decisions cannot install two
/// hooks.
pub struct RefreshBroadcaster {
    desktop: Arc<dyn Desktop>,
    identity: Arc<ExplorerIdentity>,
    focus: Arc<FocusWatcher>,
    lock: Mutex<()>,
}

impl RefreshBroadcaster {
    pub fn new(
        desktop: Arc<dyn Desktop>,
        identity: Arc<ExplorerIdentity>,
        focus: Arc<FocusWatcher>,
    ) -> Self {
        Self {
            desktop,
            identity,
            focus,
            lock: Mutex::new(()),
        }
    }

    pub fn focus_watcher(&self) -> &Arc<FocusWatcher> {
        &self.focus
    }

    /// Runs one enumerate-refresh-maybe-arm pass.
    ///
    /// Fails only if window enumeration fails or arming the watcher
    /// fails. A window that cannot be queried or refreshed is skipped.
    pub fn refresh_all(&self) -> Result<RefreshOutcome> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut outcome = RefreshOutcome {
            refreshed: refresh_open_windows(self.desktop.as_ref(), &self.identity)?,
            armed: false,
        };
        if outcome.refreshed == 0 {
            log::debug!("File Explorer not currently open");
            outcome.armed = self.focus.arm()?;
        }
        Ok(outcome)
    }
}

/// Posts the refresh command to every open Explorer window.
///
/// Returns how many Explorer windows were found. Never arms a focus
/// watcher, for callers that do not stay around to observe one.
pub fn refresh_open_windows(
    desktop: &dyn Desktop,
    identity: &ExplorerIdentity,
) -> Result<usize> {
    log::debug!("Enumerating all available windows");
    let windows = desktop.top_level_windows()?;

    let mut found = 0;
    for window in windows {
        if !identity.is_explorer(desktop, window) {
            continue;
        }
        found += 1;
        log::debug!("Posting refresh message to window 0x{:X}", window.0);
        if let Err(e) = desktop.post_refresh(window) {
            log::warn!("{e}");
        }
    }
    Ok(found)
}
