//! Utilities for file operations with automatic parent directory creation.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{IoContext, Result};

/// Ensure a directory exists, creating it if necessary.
///
/// An existing directory is not an error.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    fs::create_dir_all(path).at(path)
}

/// Write a file atomically with specific Unix permissions.
///
/// Content goes to a temporary file in the same directory, which is flushed
/// and renamed over `path`. Readers see either the old file or the new one.
pub fn write_file_atomic<C: AsRef<[u8]>>(path: &Path, content: C, mode: u32) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir_exists(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(content.as_ref()).at(tmp.path())?;
    tmp.as_file().sync_all().at(tmp.path())?;
    fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode)).at(tmp.path())?;
    tmp.persist(path).map_err(|e| e.error).at(path)?;
    Ok(())
}

/// Copy a file, creating the destination's parent directories as needed.
pub fn copy_file_with_dirs(src: &Path, dst: &Path) -> Result<u64> {
    if let Some(parent) = dst.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::copy(src, dst).at(src)
}
