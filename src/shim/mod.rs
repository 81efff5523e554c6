//! Shim install and remove entry points.
//!
//! The package manager calls [`install`] once per installed file and
//! [`remove`] once per removed file. Every successful write or removal marks
//! the context dirty so the next finalize repacks the runtime.

mod manifest;
mod script;

use tracing::debug;

use crate::classify;
use crate::common::{ensure_dir_exists, remove_file_if_exists};
use crate::context::Context;
use crate::error::Result;
use crate::paths::{build_paths, ShimPaths};

pub use manifest::{ensure_manifest, HnpInstall, HnpLink, HnpManifest};
pub use script::{render_script, write_shim, INTERPRETER, LOADER};

/// What an install or remove call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimOutcome {
    /// A shim was written.
    Installed(ShimPaths),
    /// A shim was removed, or was already absent.
    Removed { paths: ShimPaths, existed: bool },
    /// The file is not a shim candidate.
    Skipped,
}

/// Stage a shim for `relative_path` if it is an executable ELF file.
pub fn install(ctx: &mut Context, relative_path: &str) -> Result<ShimOutcome> {
    let paths = build_paths(ctx, relative_path)?;

    let root = ctx.effective_root();
    if !classify::is_shim_candidate(ctx.config.policy, &root, relative_path) {
        debug!("{}: not a shim candidate", relative_path);
        return Ok(ShimOutcome::Skipped);
    }

    ensure_dir_exists(&paths.bin_dir())?;
    if ensure_manifest(&paths.manifest())? {
        debug!("created {}", paths.manifest().display());
    }

    write_shim(&paths.shim_path, &paths.real_binary)?;
    ctx.staging.mark_dirty();
    debug!(
        "staged shim {} -> {}",
        paths.shim_path.display(),
        paths.real_binary.display()
    );

    Ok(ShimOutcome::Installed(paths))
}

/// Remove the shim staged for `relative_path`. An absent shim is not an error.
pub fn remove(ctx: &mut Context, relative_path: &str) -> Result<ShimOutcome> {
    let paths = build_paths(ctx, relative_path)?;

    let existed = remove_file_if_exists(&paths.shim_path)?;
    ctx.staging.mark_dirty();
    if existed {
        debug!("removed shim {}", paths.shim_path.display());
    }

    Ok(ShimOutcome::Removed { paths, existed })
}
