//! Win32 implementations of the ShowAllFiles platform traits, plus the
//! daemon that wires them together.
#![cfg(windows)]

/// Ctrl+C signal handler.
pub mod ctrl_c;

/// Daemon main loop.
pub mod daemon;

/// Top-level window queries and the Explorer refresh command.
pub mod desktop;

/// De-duplicated message boxes.
pub mod dialog;

/// `EVENT_SYSTEM_FOREGROUND` hook and its message pump.
pub mod foreground_hook;

/// `RegisterHotKey` backend.
pub mod hotkey;

/// IPC via Named Pipes.
pub mod ipc;

/// Change notification on the Explorer settings key.
pub mod key_watch;

/// Key name to virtual key code mapping.
pub mod keys;

/// Process utilities (alive check, termination).
pub mod process;

/// The Explorer `Hidden` registry value.
pub mod registry;

pub use desktop::Win32Desktop;
pub use foreground_hook::WinEventHook;
pub use hotkey::Win32Hotkeys;
pub use key_watch::RegistryKeyWatch;
pub use registry::RegistryStore;
