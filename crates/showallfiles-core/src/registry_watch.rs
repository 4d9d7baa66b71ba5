//! Keeps the published status in step with the backing key.
//!
//! Every change to the key, whoever made it, wakes the watcher. It
//! re-reads the status, publishes it and refreshes Explorer. The
//! notification is re-armed after every wake, so consecutive edits are
//! observed one by one; bursts are not coalesced.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::authority::StatusAuthority;
use crate::broadcast::RefreshBroadcaster;
use crate::task::{Cancel, Report, Task, TaskFailure, TaskKind};
use crate::{Error, Result};

/// Why a blocked [`KeyWatch::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The key changed.
    Changed,
    /// The watch was cancelled.
    Cancelled,
    /// The wait ended for another reason. The watcher simply re-arms.
    Spurious,
}

/// Change notification on the backing key.
pub trait KeyWatch: Send {
    /// Registers for notification of the next change.
    ///
    /// Fails with [`Error::NotificationSetupFailure`].
    fn arm(&mut self) -> Result<()>;

    /// Blocks until the key changes or the watch is cancelled.
    ///
    /// Fails with [`Error::NotificationWaitFailure`] when the wait itself
    /// cannot be performed; retrying would fail the same way.
    fn wait(&mut self) -> Result<Wake>;
}

/// A key watch together with the handle that cancels it.
pub type WatchSetup = (Box<dyn KeyWatch>, Box<dyn Cancel>);

pub struct RegistryWatcher;

impl RegistryWatcher {
    /// Runs `setup` and starts the watch loop on its result.
    ///
    /// Opening the key and creating the notification objects are part
    /// of the watcher's setup, so a failure there is reported once on
    /// `reports` like any other loop-ending failure. Returns `None` in
    /// that case; the process keeps running without a watcher.
    pub fn start(
        setup: impl FnOnce() -> Result<WatchSetup>,
        authority: Arc<StatusAuthority>,
        broadcaster: Arc<RefreshBroadcaster>,
        reports: Sender<Report>,
    ) -> Option<Task> {
        let started = setup().and_then(|(watch, cancel)| {
            Self::spawn(watch, cancel, authority, broadcaster, reports.clone())
        });
        match started {
            Ok(task) => Some(task),
            Err(e) => {
                let _ = reports.send(Report::Failed(TaskFailure::new(TaskKind::RegistryWatch, e)));
                None
            }
        }
    }

    /// Starts the watch loop on its own thread.
    ///
    /// `cancel` must wake a blocked `wait` with [`Wake::Cancelled`]. A
    /// failure to arm or wait on the notification is reported once on
    /// `reports` and ends the loop for good; the process keeps running.
    pub fn spawn(
        watch: Box<dyn KeyWatch>,
        cancel: Box<dyn Cancel>,
        authority: Arc<StatusAuthority>,
        broadcaster: Arc<RefreshBroadcaster>,
        reports: Sender<Report>,
    ) -> Result<Task> {
        let handle = thread::Builder::new()
            .name("registry-watch".into())
            .spawn(move || watch_loop(watch, &authority, &broadcaster, &reports))
            .map_err(|e| Error::NotificationSetupFailure(e.to_string()))?;

        Ok(Task::new(TaskKind::RegistryWatch, cancel, handle))
    }
}

fn watch_loop(
    mut watch: Box<dyn KeyWatch>,
    authority: &StatusAuthority,
    broadcaster: &RefreshBroadcaster,
    reports: &Sender<Report>,
) -> Result<()> {
    log::debug!("Watching {:?}", crate::store::KEY_PATH);

    loop {
        if let Err(e) = watch.arm() {
            return Err(report_fatal(reports, e));
        }

        match watch.wait() {
            Ok(Wake::Changed) => {}
            Ok(Wake::Spurious) => continue,
            Ok(Wake::Cancelled) => {
                log::debug!("Registry watch cancelled");
                return Ok(());
            }
            Err(e) => return Err(report_fatal(reports, e)),
        }

        match authority.sync() {
            Ok(status) => {
                log::debug!("Registry changed, hidden files are {status}");
                let _ = reports.send(Report::StatusChanged(status));
            }
            Err(e) => {
                log::error!("Could not re-read status after registry change: {e}");
                continue;
            }
        }

        if let Err(e) = broadcaster.refresh_all() {
            let _ = reports.send(Report::Failed(TaskFailure::new(TaskKind::Refresh, e)));
        }
    }
}

/// Reports a loop-ending failure and returns the error the loop ends with.
fn report_fatal(reports: &Sender<Report>, e: Error) -> Error {
    let ending = match &e {
        Error::NotificationWaitFailure(reason) => Error::NotificationWaitFailure(reason.clone()),
        Error::NotificationSetupFailure(reason) => Error::NotificationSetupFailure(reason.clone()),
        other => Error::NotificationSetupFailure(other.to_string()),
    };
    let _ = reports.send(Report::Failed(TaskFailure::new(TaskKind::RegistryWatch, e)));
    ending
}
