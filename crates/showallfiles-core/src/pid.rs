//! PID file used by the CLI to find (and, if needed, kill) the daemon.

use std::fs;
use std::path::PathBuf;

use crate::{Error, Result};

/// Returns `%LOCALAPPDATA%\showallfiles`, creating it if needed.
fn data_dir() -> Result<PathBuf> {
    let base = std::env::var("LOCALAPPDATA")
        .map_err(|_| Error::Config("LOCALAPPDATA environment variable not set".into()))?;

    let dir = PathBuf::from(base).join("showallfiles");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn pid_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("showallfiles.pid"))
}

/// Writes the current process's PID. Called when the daemon starts.
pub fn write_pid_file() -> Result<()> {
    fs::write(pid_path()?, std::process::id().to_string())?;
    Ok(())
}

/// Reads the daemon PID, if a PID file exists.
pub fn read_pid_file() -> Result<Option<u32>> {
    let path = pid_path()?;
    if !path.exists() {
        return Ok(None);
    }
    parse_pid(&fs::read_to_string(&path)?).map(Some)
}

/// Removes the PID file. Called on clean shutdown.
pub fn remove_pid_file() -> Result<()> {
    let path = pid_path()?;
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

fn parse_pid(contents: &str) -> Result<u32> {
    contents
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid PID file contents: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pid_trims_whitespace() {
        assert_eq!(parse_pid("4242\r\n").unwrap(), 4242);
    }

    #[test]
    fn parse_pid_rejects_garbage() {
        assert!(matches!(parse_pid("not-a-pid"), Err(Error::Config(_))));
    }
}
