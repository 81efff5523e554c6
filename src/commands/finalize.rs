//! Finalize command - packs and installs the runtime container.

use anyhow::{Context as _, Result};

use hapkg_shim::cache;
use hapkg_shim::{finalize, Context, PackOutcome, SkipReason, Toolchain};

/// Execute the finalize command.
///
/// A fresh process has no in-memory changes, so the staging digest decides
/// whether anything needs packing. `force` packs regardless.
pub fn cmd_finalize(ctx: &mut Context, tools: &Toolchain, force: bool) -> Result<()> {
    if force {
        ctx.staging.mark_dirty();
    } else if !ctx.is_dirty() {
        cache::refresh_dirty_from_disk(ctx).context("Failed to inspect staging area")?;
    }

    let outcome = finalize(ctx, tools).context("Runtime packaging failed")?;
    report(&outcome);
    Ok(())
}

pub(crate) fn report(outcome: &PackOutcome) {
    match outcome {
        PackOutcome::Installed { container } => {
            println!("Runtime container installed: {}", container.display())
        }
        PackOutcome::Skipped(SkipReason::Disabled) => {
            println!("Packaging disabled (HPKG_SKIP_SHIM_PACK is set)")
        }
        PackOutcome::Skipped(SkipReason::Clean) => println!("Runtime is up to date."),
        PackOutcome::Skipped(SkipReason::NoStaging) => println!("No staged shims to pack."),
    }
}
