//! Apply command - runs one transaction of shim installs and removes.

use anyhow::{bail, Context as _, Result};
use tracing::warn;

use hapkg_shim::{finalize, install, remove, Context, ShimOutcome, Toolchain};

use super::finalize::report;

/// One file operation of a transaction.
#[derive(Debug, Clone)]
pub enum FileOp {
    Install(String),
    Remove(String),
}

/// Execute the apply command.
///
/// Per-file failures are logged and skipped so the rest of the transaction
/// still applies; the command fails at the end if any occurred.
pub fn cmd_apply(
    ctx: &mut Context,
    tools: &Toolchain,
    ops: &[FileOp],
    run_finalize: bool,
) -> Result<()> {
    let mut installed = 0;
    let mut removed = 0;
    let mut failed = 0;

    for op in ops {
        let result = match op {
            FileOp::Install(path) => install(ctx, path),
            FileOp::Remove(path) => remove(ctx, path),
        };
        match result {
            Ok(ShimOutcome::Installed(_)) => installed += 1,
            Ok(ShimOutcome::Removed { .. }) => removed += 1,
            Ok(ShimOutcome::Skipped) => {}
            Err(e) => {
                let path = match op {
                    FileOp::Install(p) | FileOp::Remove(p) => p,
                };
                warn!("{}: {}", path, e);
                failed += 1;
            }
        }
    }

    println!(
        "Shims: {} installed, {} removed, {} skipped, {} failed",
        installed,
        removed,
        ops.len() - installed - removed - failed,
        failed
    );

    if run_finalize {
        let outcome = finalize(ctx, tools).context("Runtime packaging failed")?;
        report(&outcome);
    }

    if failed > 0 {
        bail!("{} shim operation(s) failed", failed);
    }
    Ok(())
}
