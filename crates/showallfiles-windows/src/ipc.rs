//! One-request-per-connection JSON lines over `\\.\pipe\showallfiles`.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::os::windows::io::FromRawHandle;

use serde::Serialize;
use serde::de::DeserializeOwned;
use showallfiles_core::ipc::{Command, PIPE_NAME, Response};
use showallfiles_core::{Error, Result};
use windows::Win32::Foundation::{
    CloseHandle, DUPLICATE_SAME_ACCESS, DuplicateHandle, HANDLE, INVALID_HANDLE_VALUE,
};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_SHARE_NONE, FlushFileBuffers, OPEN_EXISTING, PIPE_ACCESS_DUPLEX,
};
use windows::Win32::System::Pipes::{
    ConnectNamedPipe, CreateNamedPipeW, DisconnectNamedPipe, PIPE_READMODE_BYTE, PIPE_TYPE_BYTE,
    PIPE_UNLIMITED_INSTANCES, PIPE_WAIT, WaitNamedPipeW,
};
use windows::Win32::System::Threading::GetCurrentProcess;
use windows::core::HSTRING;

const GENERIC_READ_WRITE: u32 = 0x80000000 | 0x40000000;

/// Owns a pipe handle and closes it on drop.
struct Pipe(HANDLE);

impl Pipe {
    /// Reads one JSON line.
    fn receive<T: DeserializeOwned>(&self) -> Result<T> {
        let mut line = String::new();
        BufReader::new(self.as_file()?).read_line(&mut line)?;
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Writes one JSON line.
    fn send<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut writer = self.as_file()?;
        writeln!(writer, "{}", serde_json::to_string(value)?)?;
        writer.flush()?;
        Ok(())
    }

    /// Duplicates the handle as a `File` so the two close independently.
    fn as_file(&self) -> Result<File> {
        let mut dup = HANDLE::default();
        // SAFETY: the duplicate is owned by the returned File.
        unsafe {
            DuplicateHandle(
                GetCurrentProcess(),
                self.0,
                GetCurrentProcess(),
                &mut dup,
                0,
                false,
                DUPLICATE_SAME_ACCESS,
            )
            .map_err(win32)?;
            Ok(File::from_raw_handle(dup.0))
        }
    }
}

impl Drop for Pipe {
    fn drop(&mut self) {
        // SAFETY: the handle is owned and closed exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// The daemon's end of the pipe.
pub struct PipeServer {
    pipe: Pipe,
}

impl PipeServer {
    /// Creates a new pipe instance without waiting for a client.
    pub fn create() -> Result<Self> {
        let name = HSTRING::from(PIPE_NAME);
        // SAFETY: valid parameters; the result is checked below.
        let handle = unsafe {
            CreateNamedPipeW(
                &name,
                PIPE_ACCESS_DUPLEX,
                PIPE_TYPE_BYTE | PIPE_READMODE_BYTE | PIPE_WAIT,
                PIPE_UNLIMITED_INSTANCES,
                512,
                512,
                0,
                None,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(Error::Ipc(format!(
                "could not create {PIPE_NAME}: {}",
                windows::core::Error::from_win32().message()
            )));
        }
        Ok(Self { pipe: Pipe(handle) })
    }

    /// Blocks until a client connects, then reads its command.
    pub fn accept_command(&self) -> Result<Command> {
        // SAFETY: blocks until a client connects to this instance.
        unsafe { ConnectNamedPipe(self.pipe.0, None) }.map_err(win32)?;
        self.pipe.receive()
    }

    /// Sends the response and disconnects the client.
    pub fn send_response(&self, response: &Response) -> Result<()> {
        self.pipe.send(response)?;
        // SAFETY: waits until the client has read everything, so the
        // disconnect below does not discard the response.
        unsafe {
            let _ = FlushFileBuffers(self.pipe.0);
            DisconnectNamedPipe(self.pipe.0).map_err(win32)?;
        }
        Ok(())
    }
}

/// Sends a command to the daemon and waits for its response.
pub fn send_command(command: &Command) -> Result<Response> {
    let name = HSTRING::from(PIPE_NAME);
    // SAFETY: opens the existing pipe as a client; closed by Pipe.
    let handle = unsafe {
        CreateFileW(
            &name,
            GENERIC_READ_WRITE,
            FILE_SHARE_NONE,
            None,
            OPEN_EXISTING,
            Default::default(),
            None,
        )
    }
    .map_err(win32)?;

    let pipe = Pipe(handle);
    pipe.send(command)?;
    pipe.receive()
}

/// Checks whether the daemon's pipe exists without consuming a connection.
pub fn is_daemon_running() -> bool {
    let name = HSTRING::from(PIPE_NAME);
    // SAFETY: 1 ms timeout; only checks for an available instance.
    unsafe { WaitNamedPipeW(&name, 1).as_bool() }
}

fn win32(e: windows::core::Error) -> Error {
    Error::Ipc(e.message())
}
