//! Init command - bootstraps the default sysroot.

use anyhow::{Context as _, Result};

use hapkg_shim::sysroot;
use hapkg_shim::Context;

/// Execute the init command.
pub fn cmd_init(ctx: &Context) -> Result<()> {
    let report = sysroot::bootstrap(ctx).context("Failed to bootstrap sysroot")?;
    match report.root {
        None => println!(
            "{} is not a hapkg-managed root, leaving it alone.",
            ctx.root.display()
        ),
        Some(root) => {
            println!("Sysroot ready at {}", root.display());
            if report.needs_database {
                let mode = if report.user_mode { " (user mode)" } else { "" };
                println!("  Package database will be created on first use{}", mode);
            }
        }
    }
    Ok(())
}
