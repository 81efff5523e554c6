//! Sysroot bootstrap for the default hapkg root.
//!
//! Prepares `~/.hapkg/sysroot` with the package manager's directory layout
//! and a default repository list. Keys and CA certificates are provisioned
//! ahead of time; nothing is downloaded here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::{ensure_dir_exists, write_file_atomic};
use crate::context::Context;
use crate::error::Result;

const REPO_BASE: &str = "http://dl-cdn.alpinelinux.org/alpine/latest-stable";

/// Repositories written into a fresh sysroot.
pub fn default_repositories() -> Vec<String> {
    ["main", "community"]
        .iter()
        .map(|r| format!("{}/{}", REPO_BASE, r))
        .collect()
}

/// Directories every managed sysroot carries.
pub const SYSROOT_DIRS: &[&str] = &["etc/apk", "lib/apk/db", "var/cache/apk"];

/// What [`bootstrap`] found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// The root that was prepared. None if the root is not managed.
    pub root: Option<PathBuf>,
    /// The repositories file was written.
    pub wrote_repositories: bool,
    /// No database lock exists yet; the package manager must create it.
    pub needs_database: bool,
    /// The caller is unprivileged and should open the database in user mode.
    pub user_mode: bool,
}

/// True for roots this tool manages: empty, the default root, or any
/// path under a `.hapkg/sysroot`.
pub fn is_managed_root(ctx: &Context, root: &Path) -> bool {
    if root.as_os_str().is_empty() || root == ctx.default_root() {
        return true;
    }
    root.to_string_lossy().contains("/.hapkg/sysroot")
}

/// Write the repositories file unless a non-empty one already exists.
fn write_repositories(path: &Path) -> Result<bool> {
    if fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false) {
        return Ok(false);
    }
    let mut content = default_repositories().join("\n");
    content.push('\n');
    write_file_atomic(path, content, 0o644)?;
    info!("Initialized repositories at {}", path.display());
    Ok(true)
}

/// Prepare the sysroot. Idempotent; roots outside hapkg are left alone.
pub fn bootstrap(ctx: &Context) -> Result<BootstrapReport> {
    let root = ctx.effective_root();
    if !is_managed_root(ctx, &ctx.root) {
        return Ok(BootstrapReport::default());
    }

    ensure_dir_exists(&root)?;
    for dir in SYSROOT_DIRS {
        ensure_dir_exists(&root.join(dir))?;
    }
    let wrote_repositories = write_repositories(&root.join("etc/apk/repositories"))?;

    let needs_database = !root.join("lib/apk/db/lock").exists();
    // SAFETY: getuid has no preconditions and cannot fail.
    let user_mode = needs_database && unsafe { libc::getuid() } != 0;
    if needs_database {
        info!("Preparing apk database under {}", root.display());
    }

    Ok(BootstrapReport {
        root: Some(root),
        wrote_repositories,
        needs_database,
        user_mode,
    })
}
