//! Handles for the long-lived listener threads and their reports.

use std::fmt;
use std::thread::JoinHandle;

use crate::status::VisibilityStatus;
use crate::{Error, Result};

/// Wakes a blocked listener so its thread can return.
pub trait Cancel: Send + Sync {
    fn cancel(&self);
}

/// Identifies which subsystem produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Hotkey,
    RegistryWatch,
    FocusWatch,
    Refresh,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hotkey => "hotkey",
            Self::RegistryWatch => "registry watch",
            Self::FocusWatch => "focus watch",
            Self::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// An error attributed to the task that hit it.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: TaskKind,
    pub error: Error,
}

impl TaskFailure {
    pub fn new(task: TaskKind, error: Error) -> Self {
        Self { task, error }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.task, self.error)
    }
}

/// Something a task tells the application shell.
#[derive(Debug)]
pub enum Report {
    /// The published status changed or was re-read from the store.
    StatusChanged(VisibilityStatus),
    /// A task failed. Setup failures end the task; the rest are one-offs.
    Failed(TaskFailure),
}

/// A running listener thread that can be cancelled and joined.
pub struct Task {
    kind: TaskKind,
    cancel: Box<dyn Cancel>,
    handle: JoinHandle<Result<()>>,
}

impl Task {
    pub fn new(kind: TaskKind, cancel: Box<dyn Cancel>, handle: JoinHandle<Result<()>>) -> Self {
        Self {
            kind,
            cancel,
            handle,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns whether the thread has already returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the task to stop and waits for its result.
    pub fn stop(self) -> Result<()> {
        self.cancel.cancel();
        self.join()
    }

    /// Waits for the task to return on its own.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .unwrap_or(Err(Error::TaskPanicked(self.kind)))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("kind", &self.kind)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    struct Flag(Arc<AtomicBool>);

    impl Cancel for Flag {
        fn cancel(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn stop_cancels_and_joins() {
        // Arrange
        let stop = Arc::new(AtomicBool::new(false));
        let seen = stop.clone();
        let handle = thread::spawn(move || {
            while !seen.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        });
        let task = Task::new(TaskKind::RegistryWatch, Box::new(Flag(stop)), handle);

        // Act
        let result = task.stop();

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn join_surfaces_panics_as_errors() {
        let handle = thread::spawn(|| -> Result<()> { panic!("boom") });
        let task = Task::new(
            TaskKind::Hotkey,
            Box::new(Flag(Arc::new(AtomicBool::new(false)))),
            handle,
        );

        let err = task.join().unwrap_err();

        assert!(matches!(err, Error::TaskPanicked(TaskKind::Hotkey)));
    }

    #[test]
    fn failure_display_names_the_task() {
        let failure = TaskFailure::new(
            TaskKind::FocusWatch,
            Error::HookInstallFailure("access denied".into()),
        );

        assert_eq!(
            failure.to_string(),
            "focus watch: could not install foreground event hook: access denied"
        );
    }
}
