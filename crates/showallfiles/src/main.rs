mod commands;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use showallfiles_core::config::Overrides;

#[derive(Parser)]
#[command(
    name = "showallfiles",
    version,
    about = "Toggle hidden files in File Explorer with a global hotkey"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default configuration file
    Init,
    /// Start the daemon in the background
    Start(DaemonArgs),
    /// Run the daemon in the foreground
    Run(DaemonArgs),
    /// Stop the daemon
    Stop,
    /// Show whether the daemon is running and whether hidden files are shown
    Status,
    /// Show or hide hidden files
    Toggle,
}

/// Logging overrides shared by `start` and `run`.
#[derive(Args, Clone, Default)]
struct DaemonArgs {
    /// Minimum log level: debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Log file, or a directory to create showallfiles.log in
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

impl DaemonArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            log_level: self.log_level.clone(),
            log_file: self.log.clone(),
        }
    }

    /// Re-creates the flags for the spawned `run` process.
    #[cfg_attr(not(windows), allow(dead_code))]
    fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(level) = &self.log_level {
            args.push("--log-level".into());
            args.push(level.into());
        }
        if let Some(log) = &self.log {
            args.push("--log".into());
            args.push(log.into());
        }
        args
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Start(args) => commands::start::execute(&args),
        Commands::Run(args) => commands::run::execute(&args.overrides()),
        Commands::Stop => commands::stop::execute(),
        Commands::Status => commands::status::execute(),
        Commands::Toggle => commands::toggle::execute(),
    }
}
