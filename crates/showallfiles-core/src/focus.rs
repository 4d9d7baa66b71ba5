//! Single-shot watcher for the next Explorer window to take focus.
//!
//! When a refresh finds no Explorer window, the watcher is armed: a
//! foreground event hook is installed on a dedicated thread that pumps
//! its messages. The hook callback only forwards window handles. A
//! dispatcher thread tests each one, waits for the window to settle,
//! posts the refresh and asks the pump to quit. The pump thread then
//! removes the hook and the watcher is idle again.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::desktop::{Desktop, ExplorerIdentity, WindowHandle};
use crate::state::{HookRegistration, SharedState};
use crate::task::{Report, TaskFailure, TaskKind};
use crate::{Error, Result};

/// Foreground-window event hook plus the message loop that delivers it.
///
/// `install`, `pump` and `uninstall` are always called on the same
/// thread, in that order.
pub trait ForegroundHook: Send + Sync {
    /// Installs the hook on the calling thread.
    ///
    /// Every foreground change must be forwarded to `events` without
    /// blocking. The sender is dropped by `uninstall`.
    fn install(&self, events: Sender<WindowHandle>) -> Result<HookRegistration>;

    /// Retrieves and dispatches messages until a quit request arrives.
    fn pump(&self) -> Result<()>;

    /// Removes the hook and drops the event sender.
    fn uninstall(&self, registration: HookRegistration);

    /// Asks the pump running on `thread_id` to return.
    fn post_quit(&self, thread_id: u32) -> Result<()>;
}

/// Everything the pump and dispatcher threads need.
#[derive(Clone)]
struct Shared {
    hook: Arc<dyn ForegroundHook>,
    desktop: Arc<dyn Desktop>,
    identity: Arc<ExplorerIdentity>,
    state: Arc<SharedState>,
    settle_delay: Duration,
    reports: Sender<Report>,
}

/// Two-state machine: idle (no hook) or armed (hook installed, pump running).
///
/// The armed state is exactly "a hook registration is present in
/// [`SharedState`]".
pub struct FocusWatcher {
    shared: Shared,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl FocusWatcher {
    pub fn new(
        hook: Arc<dyn ForegroundHook>,
        desktop: Arc<dyn Desktop>,
        identity: Arc<ExplorerIdentity>,
        state: Arc<SharedState>,
        settle_delay: Duration,
        reports: Sender<Report>,
    ) -> Self {
        Self {
            shared: Shared {
                hook,
                desktop,
                identity,
                state,
                settle_delay,
                reports,
            },
            pump: Mutex::new(None),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.shared.state.hook().is_some()
    }

    /// Installs the hook and starts the pump thread.
    ///
    /// Returns `Ok(false)` if already armed. Blocks until the hook is
    /// installed and recorded, so a caller that checks [`is_armed`]
    /// afterwards never sees a stale idle state. A failed install
    /// leaves the watcher idle.
    ///
    /// [`is_armed`]: FocusWatcher::is_armed
    pub fn arm(&self) -> Result<bool> {
        let mut pump = self.pump.lock().unwrap_or_else(PoisonError::into_inner);
        if pump.as_ref().is_some_and(JoinHandle::is_finished)
            && let Some(finished) = pump.take()
        {
            self.reap(finished);
        }
        if self.is_armed() {
            log::debug!("Foreground hook is already set");
            return Ok(false);
        }
        // A previous pump may still be tearing down.
        if let Some(previous) = pump.take() {
            self.reap(previous);
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let shared = self.shared.clone();
        let handle = thread::Builder::new()
            .name("focus-watch".into())
            .spawn(move || run_pump(shared, ready_tx))
            .map_err(|e| Error::HookInstallFailure(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                *pump = Some(handle);
                Ok(true)
            }
            Ok(Err(e)) => {
                self.reap(handle);
                Err(e)
            }
            Err(_) => {
                self.reap(handle);
                Err(Error::HookInstallFailure(
                    "focus watch thread exited before installing the hook".into(),
                ))
            }
        }
    }

    /// Stops the pump if armed and waits for it to tear down.
    pub fn disarm(&self) {
        let mut pump = self.pump.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(registration) = self.shared.state.hook()
            && let Err(e) = self.shared.hook.post_quit(registration.thread_id)
        {
            log::warn!(
                "Could not post quit to thread {}: {e}",
                registration.thread_id
            );
        }
        if let Some(handle) = pump.take() {
            self.reap(handle);
        }
    }

    /// Joins a pump thread. One that panicked never removed its hook
    /// entry, so the entry is cleared here and the panic reported.
    fn reap(&self, handle: JoinHandle<()>) {
        if handle.join().is_ok() {
            return;
        }
        log::error!("Focus watch thread panicked");
        self.shared.state.clear_hook();
        let _ = self.shared.reports.send(Report::Failed(TaskFailure::new(
            TaskKind::FocusWatch,
            Error::TaskPanicked(TaskKind::FocusWatch),
        )));
    }
}

/// Body of the pump thread: install, record, pump, tear down.
fn run_pump(shared: Shared, ready: Sender<Result<()>>) {
    log::debug!("Setting foreground event hook");
    let (events_tx, events_rx) = mpsc::channel();
    let registration = match shared.hook.install(events_tx) {
        Ok(r) => r,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    shared.state.set_hook(registration);

    let dispatcher = {
        let shared = shared.clone();
        thread::spawn(move || dispatch(shared, events_rx))
    };
    let _ = ready.send(Ok(()));

    log::debug!("Watching message loop on thread {}", registration.thread_id);
    let result = shared.hook.pump();
    if result.is_ok() {
        log::debug!("Received quit request");
    }

    shared.hook.uninstall(registration);
    shared.state.clear_hook();
    let _ = dispatcher.join();

    if let Err(e) = result {
        let _ = shared
            .reports
            .send(Report::Failed(TaskFailure::new(TaskKind::FocusWatch, e)));
    }
    log::debug!("Foreground event hook removed");
}

/// Handles forwarded foreground events until the hook drops its sender.
fn dispatch(shared: Shared, events: Receiver<WindowHandle>) {
    for window in events {
        if !shared.identity.is_explorer(shared.desktop.as_ref(), window) {
            continue;
        }

        // Let the new window finish initialising before refreshing it.
        thread::sleep(shared.settle_delay);
        log::debug!("Posting refresh message to window 0x{:X}", window.0);
        if let Err(e) = shared.desktop.post_refresh(window) {
            log::warn!("{e}");
        }

        if let Some(registration) = shared.state.hook()
            && let Err(e) = shared.hook.post_quit(registration.thread_id)
        {
            log::warn!(
                "Could not post quit to thread {}: {e}",
                registration.thread_id
            );
        }
    }
}

#[cfg(test)]
#[path = "focus_tests.rs"]
mod tests;
