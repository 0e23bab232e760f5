//! Artifact writing.
//!
//! The generated source is an all-or-nothing structure: a truncated
//! `fsdata.c` would still compile as garbage or not at all. Output is
//! therefore staged in a temporary file next to the target and renamed over
//! it only once fully written. A failed run leaves the previous artifact (or
//! nothing) in place.
//!
//! ## Unchanged output
//!
//! Build systems rebuild whatever depends on `fsdata.c` when its mtime
//! moves. When the target already holds exactly the bytes we would write
//! (compared by SHA-256 digest) the write is skipped, so regenerating an
//! unchanged web root doesn't trigger a firmware rebuild.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Unchanged => "unchanged",
        })
    }
}

/// SHA-256 of some bytes, as a hex string.
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents, or `None` if it can't be read.
fn file_digest(path: &Path) -> Option<String> {
    fs::read(path).ok().map(|bytes| digest(&bytes))
}

/// Atomically replace `path` with `contents`, unless it already matches.
pub fn write_artifact(path: &Path, contents: &[u8]) -> Result<WriteOutcome, WriteError> {
    let existing = file_digest(path);
    if existing.as_deref() == Some(digest(contents).as_str()) {
        tracing::debug!(path = %path.display(), "output unchanged, not rewriting");
        return Ok(WriteOutcome::Unchanged);
    }

    let io_err = |source: io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(contents).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;

    let outcome = if existing.is_some() {
        WriteOutcome::Updated
    } else {
        WriteOutcome::Created
    };
    tracing::debug!(path = %path.display(), bytes = contents.len(), %outcome, "output written");
    Ok(outcome)
}
