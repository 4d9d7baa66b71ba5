pub mod authority;
pub mod broadcast;
pub mod config;
pub mod desktop;
pub mod error;
pub mod focus;
pub mod hotkey;
pub mod ipc;
pub mod logging;
pub mod pid;
pub mod registry_watch;
pub mod state;
pub mod status;
pub mod store;
pub mod task;

#[cfg(test)]
mod fakes;

pub use authority::StatusAuthority;
pub use broadcast::{RefreshBroadcaster, RefreshOutcome, refresh_open_windows};
pub use config::Config;
pub use desktop::{Desktop, ExplorerIdentity, WindowHandle};
pub use error::{Error, Result};
pub use focus::{FocusWatcher, ForegroundHook};
pub use hotkey::{Hotkey, HotkeyBackend, HotkeyListener, Modifier};
pub use ipc::{Command, PIPE_NAME, Response};
pub use registry_watch::{KeyWatch, RegistryWatcher, Wake, WatchSetup};
pub use state::{HookRegistration, SharedState};
pub use status::VisibilityStatus;
pub use store::{BackingStore, StoreKey};
pub use task::{Cancel, Report, Task, TaskFailure, TaskKind};
