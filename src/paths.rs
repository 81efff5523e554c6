//! Prefix resolution and the paths derived from it.
//!
//! Install and remove both call [`build_paths`], so remove finds exactly
//! what install created without any persisted index. Everything here is
//! pure path arithmetic.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::config::{
    CONTAINER_NAME, CONTAINER_SCRATCH, MANIFEST_FILE, PACKED_ARTIFACT, RUNTIME_NAME,
    STAGING_DIGEST,
};
use crate::context::{Context, SYSROOT_DIR};
use crate::error::{Result, ShimError};

/// Platform path length limit, including the terminating NUL.
pub const PATH_LIMIT: usize = libc::PATH_MAX as usize;

const SYSROOT_SUFFIX: &[u8] = b"/sysroot";

/// Fail with `PathTooLong` if `path` would not fit in a PATH_MAX buffer.
pub fn check_len(path: &Path) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= PATH_LIMIT {
        return Err(ShimError::PathTooLong {
            path: path.to_string_lossy().into_owned(),
            len,
            limit: PATH_LIMIT,
        });
    }
    Ok(())
}

fn checked(path: PathBuf) -> Result<PathBuf> {
    check_len(&path)?;
    Ok(path)
}

/// Resolve the prefix that holds `sysroot/` and `temp/`.
///
/// Precedence: the override from the environment, then the configured root
/// with a trailing `/sysroot` removed, then the context's default prefix
/// when no root is given.
pub fn resolve_prefix(ctx: &Context) -> Result<PathBuf> {
    if let Some(prefix) = &ctx.config.prefix_override {
        if !prefix.as_os_str().is_empty() {
            return checked(prefix.clone());
        }
    }

    let mut root = ctx.root.as_os_str().as_bytes();
    if root.is_empty() {
        return checked(ctx.default_prefix());
    }

    while root.len() > 1 && root.ends_with(b"/") {
        root = &root[..root.len() - 1];
    }
    if root.ends_with(SYSROOT_SUFFIX) {
        root = &root[..root.len() - SYSROOT_SUFFIX.len()];
        // `/sysroot` lives directly under `/`
        if root.is_empty() {
            return Ok(PathBuf::from("/"));
        }
    }

    checked(PathBuf::from(OsStr::from_bytes(root)))
}

/// A validated path relative to the sysroot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath<'a> {
    /// Path with leading separators removed.
    pub path: &'a str,
    /// Final component.
    pub basename: &'a str,
}

impl<'a> RelativePath<'a> {
    /// Normalize and validate a path handed over by the package manager.
    pub fn parse(raw: &'a str) -> Result<Self> {
        let invalid = |reason| ShimError::InvalidInput {
            path: raw.to_string(),
            reason,
        };

        if raw.contains('\0') {
            return Err(invalid("contains a NUL byte"));
        }
        let path = raw.trim_start_matches('/');
        if path.is_empty() {
            return Err(invalid("empty path"));
        }
        let basename = path.rsplit('/').next().unwrap_or(path);
        if basename.is_empty() || basename == "." {
            return Err(invalid("no basename"));
        }
        if path.split('/').any(|c| c == "..") {
            return Err(invalid("escapes the sysroot"));
        }

        Ok(Self { path, basename })
    }
}

/// Paths for one install or remove call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimPaths {
    /// `<prefix>/temp/<runtime>`
    pub staging_root: PathBuf,
    /// `<staging_root>/bin/<basename>`
    pub shim_path: PathBuf,
    /// `<prefix>/sysroot/<relative path>`
    pub real_binary: PathBuf,
}

impl ShimPaths {
    pub fn bin_dir(&self) -> PathBuf {
        self.staging_root.join("bin")
    }

    pub fn manifest(&self) -> PathBuf {
        self.staging_root.join(MANIFEST_FILE)
    }
}

/// Derive the staging root, shim path and real binary path.
pub fn build_paths(ctx: &Context, relative_path: &str) -> Result<ShimPaths> {
    let rel = RelativePath::parse(relative_path)?;
    let prefix = resolve_prefix(ctx)?;

    let staging_root = checked(staging_root(&prefix))?;
    let shim_path = checked(staging_root.join("bin").join(rel.basename))?;
    let real_binary = checked(prefix.join(SYSROOT_DIR).join(rel.path))?;

    Ok(ShimPaths {
        staging_root,
        shim_path,
        real_binary,
    })
}

fn staging_root(prefix: &Path) -> PathBuf {
    prefix.join("temp").join(RUNTIME_NAME)
}

/// Paths used by the packaging pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackPaths {
    /// `<prefix>/temp/<runtime>`
    pub staging_root: PathBuf,
    /// `<prefix>/temp`
    pub output_dir: PathBuf,
    /// Packer output inside `output_dir`.
    pub artifact: PathBuf,
    /// Final container handed to the installer.
    pub container: PathBuf,
    /// Scratch directory for container assembly.
    pub scratch: PathBuf,
    /// Digest of the staging tree at the last successful pack.
    pub digest: PathBuf,
}

impl PackPaths {
    pub fn resolve(ctx: &Context) -> Result<Self> {
        let prefix = resolve_prefix(ctx)?;
        let output_dir = checked(prefix.join("temp"))?;
        Ok(Self {
            staging_root: checked(staging_root(&prefix))?,
            artifact: checked(output_dir.join(PACKED_ARTIFACT))?,
            container: checked(output_dir.join(CONTAINER_NAME))?,
            scratch: checked(output_dir.join(CONTAINER_SCRATCH))?,
            digest: checked(output_dir.join(STAGING_DIGEST))?,
            output_dir,
        })
    }
}

/// Internal path of the packed artifact inside the container.
pub fn container_entry(arch: &str) -> PathBuf {
    Path::new("hnp").join(arch).join(PACKED_ARTIFACT)
}
