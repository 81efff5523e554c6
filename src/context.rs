//! Per-transaction context and staging state.

use std::path::PathBuf;

use crate::config::Config;

/// Directory under the home directory that holds the default prefix.
pub const HAPKG_DIR: &str = ".hapkg";
/// Name of the sysroot directory inside a prefix.
pub const SYSROOT_DIR: &str = "sysroot";

/// Tracks whether the staging area changed since the last successful pack.
///
/// Only the packaging pipeline clears the flag, and only after every stage
/// succeeded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StagingState {
    dirty: bool,
}

impl StagingState {
    /// Record that a shim was written or removed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Current flag. Does not clear it.
    pub fn consume_if_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear(&mut self) {
        self.dirty = false;
    }
}

/// State shared by every install, remove and finalize call of one
/// package-manager run.
#[derive(Debug, Clone)]
pub struct Context {
    /// Installed sysroot. Empty means the default root under the home dir.
    pub root: PathBuf,
    pub config: Config,
    pub staging: StagingState,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            staging: StagingState::default(),
        }
    }

    /// Prefix used when no root is given: `<home>/.hapkg`, or `/` without
    /// a home directory.
    pub fn default_prefix(&self) -> PathBuf {
        match &self.config.home {
            Some(home) => home.join(HAPKG_DIR),
            None => PathBuf::from("/"),
        }
    }

    /// Default sysroot, always `<default prefix>/sysroot`.
    pub fn default_root(&self) -> PathBuf {
        self.default_prefix().join(SYSROOT_DIR)
    }

    /// The sysroot actually operated on.
    pub fn effective_root(&self) -> PathBuf {
        if self.root.as_os_str().is_empty() {
            self.default_root()
        } else {
            self.root.clone()
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.staging.consume_if_dirty()
    }
}
