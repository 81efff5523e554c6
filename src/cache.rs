//! Staging digest - hash-based change detection.
//!
//! The dirty flag only covers the current process. The digest recorded after
//! each successful pack lets a later process notice staged changes it did
//! not make itself.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::warn;
use walkdir::WalkDir;

use crate::common::write_file_atomic;
use crate::context::Context;
use crate::error::{IoContext, Result, ShimError};
use crate::paths::PackPaths;

/// Compute a SHA256 over every entry of the staging tree.
///
/// Relative paths, symlink targets and file contents all contribute, walked
/// in sorted order. Returns None if the directory does not exist.
pub fn hash_tree(dir: &Path) -> Result<Option<String>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut hasher = Sha256::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ShimError::io(path, e.into())
        })?;
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update([0u8]);

        let file_type = entry.file_type();
        if file_type.is_file() {
            hasher.update(b"f");
            hasher.update(fs::read(entry.path()).at(entry.path())?);
        } else if file_type.is_symlink() {
            hasher.update(b"l");
            let target = fs::read_link(entry.path()).at(entry.path())?;
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            hasher.update(b"d");
        }
        hasher.update([0u8]);
    }
    Ok(Some(format!("{:x}", hasher.finalize())))
}

/// Read cached hash from a .sha256 file.
/// Returns None if the file doesn't exist or can't be read.
pub fn read_cached_hash(hash_file: &Path) -> Option<String> {
    if !hash_file.exists() {
        return None;
    }
    match fs::read_to_string(hash_file) {
        Ok(s) => Some(s.trim().to_string()),
        Err(e) => {
            warn!(
                "failed to read staging digest {}: {} (will repack)",
                hash_file.display(),
                e
            );
            None
        }
    }
}

/// Write hash to a .sha256 file.
pub fn write_cached_hash(hash_file: &Path, hash: &str) -> Result<()> {
    write_file_atomic(hash_file, format!("{}\n", hash), 0o644)
}

/// Mark the context dirty if the staging tree differs from the last pack.
///
/// A staging tree with no recorded digest counts as changed. Returns the
/// resulting dirty flag.
pub fn refresh_dirty_from_disk(ctx: &mut Context) -> Result<bool> {
    let paths = PackPaths::resolve(ctx)?;
    if let Some(current) = hash_tree(&paths.staging_root)? {
        if read_cached_hash(&paths.digest).as_deref() != Some(current.as_str()) {
            ctx.staging.mark_dirty();
        }
    }
    Ok(ctx.is_dirty())
}

/// Record the digest of the staging tree as packed.
pub fn record_staging_digest(paths: &PackPaths) -> Result<()> {
    if let Some(hash) = hash_tree(&paths.staging_root)? {
        write_cached_hash(&paths.digest, &hash)?;
    }
    Ok(())
}
