//! hapkg-shim: runtime shim staging and packaging.
//!
//! The package manager drives three entry points:
//! - [`install`] once per installed file
//! - [`remove`] once per removed file
//! - [`finalize`] once per completed transaction
//!
//! Installed ELF executables get a wrapper script in the staging area. When
//! the staging area changed, finalize packs it, injects it into the base
//! runtime container and installs the result.

pub mod cache;
pub mod classify;
pub mod common;
pub mod config;
pub mod context;
pub mod error;
pub mod pack;
pub mod paths;
pub mod preflight;
pub mod process;
pub mod shim;
pub mod sysroot;

pub use config::Config;
pub use context::{Context, StagingState};
pub use error::{Result, ShimError, ToolFailure};
pub use pack::{finalize, pack, PackOutcome, SkipReason, Toolchain};
pub use paths::{build_paths, resolve_prefix, ShimPaths};
pub use shim::{install, remove, ShimOutcome};
