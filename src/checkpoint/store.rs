//! Checkpoint Persistence
//!
//! The checkpoint (savefile) records outstanding tasks, one fully
//! substituted command per line. It is read once when a session starts
//! and rewritten as a whole when the session ends or is interrupted.
//! Writes go to a sibling temporary file that is renamed over the
//! checkpoint, so a reader never sees a half-written list. A savefile
//! that is a symlink is written through: the link stays and the file it
//! points to is replaced, keeping its permissions.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Checkpoint I/O failures. Always fatal to a session.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("cannot read checkpoint {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write checkpoint {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Reads outstanding tasks from any line source.
///
/// Each non-empty line is one task, taken verbatim apart from its line
/// terminator.
pub fn read_outstanding<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut tasks = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let task = line.trim_end_matches(['\r', '\n']);
        if !task.trim().is_empty() {
            tasks.push(task.to_string());
        }
    }
    Ok(tasks)
}

/// Writes tasks one per line, newline-terminated, in the given order.
pub fn write_outstanding<W: Write>(mut writer: W, tasks: &[String]) -> io::Result<()> {
    for task in tasks {
        writeln!(writer, "{}", task)?;
    }
    writer.flush()
}

/// File-backed checkpoint of outstanding tasks.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store bound to a checkpoint path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the checkpoint path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verifies the checkpoint can be written, creating it if absent.
    ///
    /// Checks both the file and its directory, since a save stages a
    /// temporary file next to the target. Existing content is left
    /// untouched.
    pub fn ensure_writable(&self) -> Result<(), CheckpointError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;

        let target = self.target_path();
        NamedTempFile::new_in(staging_dir(&target)).map_err(|source| self.write_error(source))?;
        Ok(())
    }

    /// Loads outstanding tasks. A missing file means no prior work.
    pub fn load_outstanding(&self) -> Result<Vec<String>, CheckpointError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No checkpoint at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.read_error(source)),
        };

        let tasks = read_outstanding(BufReader::new(file)).map_err(|source| self.read_error(source))?;
        info!(
            "Loaded {} outstanding task(s) from {}",
            tasks.len(),
            self.path.display()
        );
        Ok(tasks)
    }

    /// Replaces the checkpoint content with `tasks`.
    pub fn save_outstanding(&self, tasks: &[String]) -> Result<(), CheckpointError> {
        let target = self.target_path();

        let mut temp =
            NamedTempFile::new_in(staging_dir(&target)).map_err(|source| self.write_error(source))?;
        write_outstanding(BufWriter::new(temp.as_file_mut()), tasks)
            .map_err(|source| self.write_error(source))?;
        if let Ok(existing) = fs::metadata(&target) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|source| self.write_error(source))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|source| self.write_error(source))?;
        temp.persist(&target)
            .map_err(|e| self.write_error(e.error))?;

        info!(
            "Saved {} outstanding task(s) to {}",
            tasks.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Truncates the checkpoint to empty.
    pub fn clear(&self) -> Result<(), CheckpointError> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;

        info!("Cleared checkpoint {}", self.path.display());
        Ok(())
    }

    /// The file a save replaces: the savefile with symlinks resolved, or
    /// the savefile path itself when it does not exist yet.
    fn target_path(&self) -> PathBuf {
        fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    fn read_error(&self, source: io::Error) -> CheckpointError {
        CheckpointError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: io::Error) -> CheckpointError {
        CheckpointError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Directory holding the temporary file for a save of `target`.
fn staging_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
