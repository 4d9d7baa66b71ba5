pub mod init;

#[cfg(windows)]
pub mod banner;
#[cfg(windows)]
pub mod run;
#[cfg(windows)]
pub mod start;
#[cfg(windows)]
pub mod status;
#[cfg(windows)]
pub mod stop;
#[cfg(windows)]
pub mod toggle;

#[cfg(not(windows))]
pub use unsupported::{run, start, status, stop, toggle};

/// Stand-ins for the daemon commands on platforms without Explorer.
#[cfg(not(windows))]
mod unsupported {
    fn bail() -> ! {
        eprintln!("Error: showallfiles requires Windows.");
        std::process::exit(1);
    }

    pub mod start {
        pub fn execute(_args: &crate::DaemonArgs) {
            super::bail()
        }
    }

    pub mod run {
        pub fn execute(_overrides: &showallfiles_core::config::Overrides) {
            super::bail()
        }
    }

    pub mod stop {
        pub fn execute() {
            super::bail()
        }
    }

    pub mod status {
        pub fn execute() {
            super::bail()
        }
    }

    pub mod toggle {
        pub fn execute() {
            super::bail()
        }
    }
}
