//! Decide which installed files get a shim.
//!
//! Negative answers are never errors: a file that cannot be looked up, read,
//! or recognized is simply not a candidate.

use std::fs::{self, File};
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::config::ShimPolicy;

/// ELF identification bytes.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Conventional binary directories, relative to the sysroot.
pub const BIN_DIRS: &[&str] = &["bin/", "sbin/", "usr/bin/", "usr/sbin/", "usr/local/bin/"];

/// Returns true if `relative_path` lives in one of [`BIN_DIRS`].
pub fn in_bin_dir(relative_path: &str) -> bool {
    let path = relative_path.trim_start_matches('/');
    BIN_DIRS.iter().any(|dir| path.starts_with(dir))
}

/// Returns true if the file is a regular executable ELF file.
///
/// Symlinks are not followed; a symlink is never a candidate.
pub fn is_executable_elf(root: &Path, relative_path: &str) -> bool {
    let path = root.join(relative_path.trim_start_matches('/'));

    let meta = match fs::symlink_metadata(&path) {
        Ok(m) => m,
        Err(_) => return false,
    };
    if !meta.file_type().is_file() {
        return false;
    }
    if meta.permissions().mode() & 0o111 == 0 {
        return false;
    }

    let mut magic = [0u8; 4];
    match File::open(&path).and_then(|mut f| f.read_exact(&mut magic)) {
        Ok(()) => magic == ELF_MAGIC,
        Err(_) => false,
    }
}

/// Apply `policy` and the ELF check to one installed file.
pub fn is_shim_candidate(policy: ShimPolicy, root: &Path, relative_path: &str) -> bool {
    if policy == ShimPolicy::BinDirsOnly && !in_bin_dir(relative_path) {
        return false;
    }
    is_executable_elf(root, relative_path)
}
