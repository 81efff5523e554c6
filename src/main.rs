//! hapkg-shim - runtime shim manager for hapkg sysroots.
//!
//! Generates wrapper scripts for executables installed into the sysroot and
//! packs them into the runtime container:
//! - `apply` stages shims for one transaction and finalizes
//! - `finalize` repacks and installs the runtime container
//! - `init` bootstraps the default sysroot

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::apply::FileOp;
use hapkg_shim::shim::render_script;
use hapkg_shim::{Config, Context, Toolchain};

#[derive(Parser)]
#[command(name = "hapkg-shim")]
#[command(about = "Runtime shim manager for hapkg sysroots")]
#[command(
    after_help = "QUICK START:\n  hapkg-shim init                          Prepare ~/.hapkg/sysroot\n  hapkg-shim apply --install usr/bin/foo   Stage a shim and repack\n  hapkg-shim preflight                     Check packaging tools"
)]
struct Cli {
    /// Installed sysroot (default: ~/.hapkg/sysroot)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one transaction: installs, then removes, then finalize
    Apply {
        /// Relative path of an installed file
        #[arg(long = "install", value_name = "REL")]
        installs: Vec<String>,
        /// Relative path of a removed file
        #[arg(long = "remove", value_name = "REL")]
        removes: Vec<String>,
        /// Stage shims only; don't pack
        #[arg(long)]
        no_finalize: bool,
    },

    /// Stage shims for installed files, then finalize
    Install {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Remove shims for removed files, then finalize
    Remove {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Pack and install the runtime container if the staging area changed
    Finalize {
        /// Pack even if nothing appears to have changed
        #[arg(long)]
        force: bool,
    },

    /// Print the wrapper script for a real binary path
    Render { real_binary: PathBuf },

    /// Bootstrap the default sysroot
    Init,

    /// Show configuration and resolved paths
    Show,

    /// Run preflight checks (verify packaging tools)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("HPKG_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config = Config::from_env();
    let tools = Toolchain::from_config(&config);
    let mut ctx = Context::new(cli.root.unwrap_or_default(), config);

    match cli.command {
        Commands::Apply {
            installs,
            removes,
            no_finalize,
        } => {
            let ops: Vec<FileOp> = installs
                .into_iter()
                .map(FileOp::Install)
                .chain(removes.into_iter().map(FileOp::Remove))
                .collect();
            commands::cmd_apply(&mut ctx, &tools, &ops, !no_finalize)?;
        }
        Commands::Install { paths } => {
            let ops: Vec<FileOp> = paths.into_iter().map(FileOp::Install).collect();
            commands::cmd_apply(&mut ctx, &tools, &ops, true)?;
        }
        Commands::Remove { paths } => {
            let ops: Vec<FileOp> = paths.into_iter().map(FileOp::Remove).collect();
            commands::cmd_apply(&mut ctx, &tools, &ops, true)?;
        }
        Commands::Finalize { force } => {
            commands::cmd_finalize(&mut ctx, &tools, force)?;
        }
        Commands::Render { real_binary } => {
            print!("{}", render_script(&real_binary));
        }
        Commands::Init => {
            commands::cmd_init(&ctx)?;
        }
        Commands::Show => {
            commands::cmd_show(&ctx)?;
        }
        Commands::Preflight { strict } => {
            commands::cmd_preflight(&ctx.config, strict)?;
        }
    }

    Ok(())
}
