use std::{
    ffi::OsString,
    path::Path,
    process::Command,
};

use crate::error::{Error, Result};

/// Command used to open files.
pub const DEFAULT_COMMAND: &str = "plumb";

/// Plumber port messages are sent to.
pub const DEFAULT_DEST: &str = "edit";

/// Sends paths to the editor through an external plumb command.
#[derive(Debug, Clone)]
pub struct Plumber {
    command: String,
    dest: String,
}

impl Default for Plumber {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_DEST)
    }
}

impl Plumber {
    pub fn new(command: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dest: dest.into(),
        }
    }

    /// The message data for `path`, with `:addr` appended when given.
    pub fn message(path: &Path, addr: Option<&str>) -> OsString {
        let mut data = path.as_os_str().to_os_string();
        if let Some(addr) = addr.filter(|a| !a.is_empty()) {
            data.push(":");
            data.push(addr);
        }
        data
    }

    /// Run `<command> -d <dest> <path>[:<addr>]` and wait for it.
    ///
    /// Any failure, including a non-zero exit, is returned with the
    /// command's combined output.
    pub fn open(&self, path: &Path, addr: Option<&str>) -> Result<()> {
        let data = Self::message(path, addr);
        tracing::debug!(command = %self.command, dest = %self.dest, data = ?data, "plumbing");

        let output = Command::new(&self.command)
            .arg("-d")
            .arg(&self.dest)
            .arg(&data)
            .output()
            .map_err(|source| Error::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined =
                String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::Plumb {
                command: self.command.clone(),
                status: output.status,
                output: combined,
            });
        }

        Ok(())
    }
}
