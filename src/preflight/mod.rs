//! Preflight checks for runtime packaging.
//!
//! Validates the external tools and base container before a finalize.
//! Run with `hapkg-shim preflight` to check everything is ready.

mod host_tools;
mod types;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = host_tools::check_host_tools(config);
    checks.push(host_tools::check_base_runtime(config));
    if config.skip_pack {
        checks.push(CheckResult::warn(
            "packaging",
            "Disabled by HPKG_SKIP_SHIM_PACK - finalize will not pack",
        ));
    }
    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before packaging.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
