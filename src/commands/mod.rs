//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `apply` - Run one transaction of installs and removes
//! - `finalize` - Pack and install the runtime container
//! - `init` - Bootstrap the default sysroot
//! - `show` - Display configuration and resolved paths
//! - `preflight` - Run preflight checks

pub mod apply;
pub mod finalize;
mod init;
mod preflight;
pub mod show;

pub use apply::cmd_apply;
pub use finalize::cmd_finalize;
pub use init::cmd_init;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
