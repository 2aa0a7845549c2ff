//! Runtime Defaults
//!
//! Worker count and savefile resolution, and output sink selection.
//!
//! # Savefile Resolution Priority
//!
//! 1. `--savefile` on the command line (handled by the caller)
//! 2. `MULTIPLEXER_SAVEFILE` environment variable
//! 3. `~/.multiplexer_progress`
//! 4. `.multiplexer_progress` in the current directory when no home
//!    directory is known

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;

use crate::execution::{OutputSinks, Sink};

/// File name of the default savefile.
pub const SAVEFILE_NAME: &str = ".multiplexer_progress";

/// Environment variable overriding the default savefile location.
pub const SAVEFILE_ENV: &str = "MULTIPLEXER_SAVEFILE";

/// Cores left free for the rest of the system by the default worker count.
const RESERVED_CPUS: usize = 2;

/// Smallest worker count chosen automatically.
const MIN_DEFAULT_WORKERS: usize = 2;

/// Lazily-resolved default savefile path.
pub static DEFAULT_SAVEFILE: Lazy<PathBuf> = Lazy::new(|| {
    let path = resolve_savefile_path(env::var_os(SAVEFILE_ENV), dirs::home_dir());
    debug!("Default savefile: {}", path.display());
    path
});

/// Picks the savefile path from an optional override and home directory.
pub fn resolve_savefile_path(env_override: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    match home {
        Some(home) => home.join(SAVEFILE_NAME),
        None => PathBuf::from(SAVEFILE_NAME),
    }
}

/// Worker count for a machine with `cpus` cores.
///
/// Leaves two cores free, but never goes below two workers.
pub fn workers_for_cpus(cpus: usize) -> usize {
    cpus.saturating_sub(RESERVED_CPUS).max(MIN_DEFAULT_WORKERS)
}

/// Worker count for this machine.
pub fn default_worker_count() -> usize {
    workers_for_cpus(num_cpus::get())
}

/// Uses the requested worker count, or the machine default when none was given.
pub fn resolve_worker_count(requested: Option<usize>) -> usize {
    requested.unwrap_or_else(default_worker_count)
}

/// Builds task output sinks from command-line choices.
///
/// Explicit files win over `inherit`; without either the stream is discarded.
pub fn output_sinks(
    stdout: Option<&Path>,
    stderr: Option<&Path>,
    inherit: bool,
) -> io::Result<OutputSinks> {
    let fallback = if inherit {
        OutputSinks::inherit()
    } else {
        OutputSinks::discard()
    };

    Ok(OutputSinks {
        stdout: match stdout {
            Some(path) => Sink::append_to(path)?,
            None => fallback.stdout,
        },
        stderr: match stderr {
            Some(path) => Sink::append_to(path)?,
            None => fallback.stderr,
        },
    })
}
