//! Child Output Sinks
//!
//! Where task processes send their stdout and stderr. Output is
//! discarded unless the operator asks for it.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::Stdio;

/// Destination for one output stream of every task.
#[derive(Debug, Default)]
pub enum Sink {
    /// Send output to the null device
    #[default]
    Discard,
    /// Share the parent's stream
    Inherit,
    /// Append to a file shared by all tasks
    File(File),
}

impl Sink {
    /// Opens `path` for appending, creating it if needed.
    pub fn append_to(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(file))
    }

    /// Produces a fresh `Stdio` for one child process.
    pub fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Self::Discard => Stdio::null(),
            Self::Inherit => Stdio::inherit(),
            Self::File(file) => Stdio::from(file.try_clone()?),
        })
    }
}

/// Stdout and stderr destinations for task processes.
#[derive(Debug, Default)]
pub struct OutputSinks {
    pub stdout: Sink,
    pub stderr: Sink,
}

impl OutputSinks {
    /// Discards both streams.
    pub fn discard() -> Self {
        Self::default()
    }

    /// Passes both streams through to the terminal.
    pub fn inherit() -> Self {
        Self {
            stdout: Sink::Inherit,
            stderr: Sink::Inherit,
        }
    }
}
