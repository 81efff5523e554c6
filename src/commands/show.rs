//! Show command - displays information.

use anyhow::Result;

use hapkg_shim::paths::PackPaths;
use hapkg_shim::{resolve_prefix, Context};

/// Execute the show command.
pub fn cmd_show(ctx: &Context) -> Result<()> {
    ctx.config.print();
    println!();

    let paths = PackPaths::resolve(ctx)?;
    println!("Paths:");
    println!("  Root:      {}", ctx.effective_root().display());
    println!("  Prefix:    {}", resolve_prefix(ctx)?.display());
    println!("  Staging:   {}", paths.staging_root.display());
    println!("  Bundle:    {}", paths.artifact.display());
    println!("  Container: {}", paths.container.display());
    if paths.staging_root.is_dir() {
        let shims = std::fs::read_dir(paths.staging_root.join("bin"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        println!("  Staged shims: {}", shims);
    } else {
        println!("  Staged shims: none (staging directory absent)");
    }
    Ok(())
}
