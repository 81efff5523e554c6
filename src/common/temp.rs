//! Utilities for resetting scratch directories and stale outputs.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{IoContext, Result};

/// Prepare a work directory, removing it if it exists and creating it fresh.
///
/// Anything left behind by an earlier failed run is discarded.
pub fn prepare_work_dir(work_dir: &Path) -> Result<()> {
    match fs::remove_dir_all(work_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).at(work_dir),
    }
    fs::create_dir_all(work_dir).at(work_dir)
}

/// Remove a file, treating "not found" as success.
///
/// Returns true if a file was actually removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).at(path),
    }
}
