//! Runtime packaging pipeline.
//!
//! Turns the staged shims into a container and installs it:
//!
//! 1. Reset outputs (output dir exists, stale bundle and container removed)
//! 2. Pack the staging directory with the packer
//! 3. Assemble a fresh container from the base with the bundle injected
//! 4. Install the container
//!
//! Any failure aborts the run and leaves the context dirty, so the next
//! finalize starts over from the top.

mod tools;

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::cache;
use crate::common::{ensure_dir_exists, remove_file_if_exists};
use crate::context::Context;
use crate::error::Result;
use crate::paths::{container_entry, PackPaths};

pub use tools::{
    inject_artifact, Archiver, ContainerJob, CopyArchiver, HnpPacker, HorpkgInstaller, Installer,
    Packer, Toolchain, UnpackArchiver,
};

/// Why the pipeline did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// HPKG_SKIP_SHIM_PACK is set.
    Disabled,
    /// No shim changed since the last successful pack.
    Clean,
    /// The staging directory is gone; the dirty flag was cleared.
    NoStaging,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    Skipped(SkipReason),
    /// The container was built and handed to the installer.
    Installed { container: PathBuf },
}

/// Run the pipeline if the staging area is dirty.
pub fn pack(ctx: &mut Context, tools: &Toolchain) -> Result<PackOutcome> {
    if ctx.config.skip_pack {
        return Ok(PackOutcome::Skipped(SkipReason::Disabled));
    }
    if !ctx.staging.consume_if_dirty() {
        return Ok(PackOutcome::Skipped(SkipReason::Clean));
    }

    let paths = PackPaths::resolve(ctx)?;
    if !paths.staging_root.is_dir() {
        info!(
            "staging directory {} is gone, nothing to pack",
            paths.staging_root.display()
        );
        ctx.staging.clear();
        return Ok(PackOutcome::Skipped(SkipReason::NoStaging));
    }

    info!("Packing runtime shims from {}", paths.staging_root.display());

    ensure_dir_exists(&paths.output_dir)?;
    remove_file_if_exists(&paths.artifact)?;
    remove_file_if_exists(&paths.container)?;

    let artifact = stage("pack", || {
        tools.packer.pack(&paths.staging_root, &paths.output_dir)
    })?;

    let entry = container_entry(&ctx.config.hnp_arch);
    stage("assemble", || {
        tools.archiver.assemble(&ContainerJob {
            base: &ctx.config.base_runtime,
            artifact: &artifact,
            entry: &entry,
            scratch: &paths.scratch,
            destination: &paths.container,
        })
    })?;

    stage("install", || {
        tools
            .installer
            .install(&ctx.config.install_pin, &paths.container)
    })?;

    if let Err(e) = cache::record_staging_digest(&paths) {
        warn!("failed to record staging digest: {}", e);
    }
    ctx.staging.clear();

    info!("Installed runtime container {}", paths.container.display());
    Ok(PackOutcome::Installed {
        container: paths.container,
    })
}

/// Run one pipeline stage inside its own span, logging the elapsed time
/// when it succeeds.
fn stage<T>(name: &'static str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    let span = info_span!("stage", name);
    let _guard = span.enter();
    let start = Instant::now();
    let value = run()?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "{} finished", name
    );
    Ok(value)
}

/// Transaction-end entry point: [`pack`], with failures surfaced as warnings.
///
/// Already-applied file installs are not reverted; the error is returned so
/// the caller can decide whether it aborts the transaction.
pub fn finalize(ctx: &mut Context, tools: &Toolchain) -> Result<PackOutcome> {
    pack(ctx, tools).inspect_err(|e| match e.tool() {
        Some(tool) => warn!(
            "runtime packaging failed at '{}': {} (will retry on next finalize)",
            tool, e
        ),
        None => warn!("runtime packaging failed: {} (will retry on next finalize)", e),
    })
}
