//! Error types for shim staging and packaging.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ShimError>;

/// Errors that can occur while staging shims or packing the runtime.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The relative path is empty, has no basename, or escapes the sysroot.
    #[error("invalid relative path '{path}': {reason}")]
    InvalidInput {
        /// The path as given by the caller.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A composed path exceeds the platform path length limit.
    #[error("path too long ({len} bytes, limit {limit}): {path}")]
    PathTooLong {
        /// Lossy rendering of the offending path.
        path: String,
        /// Its length in bytes.
        len: usize,
        /// The platform limit.
        limit: usize,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// An external tool could not be started or exited unsuccessfully.
    #[error("external tool '{tool}' {failure}")]
    ExternalTool {
        /// Program name as invoked.
        tool: String,
        /// What went wrong.
        failure: ToolFailure,
    },

    /// The bundle manifest could not be encoded.
    #[error("failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// How an external tool failed.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// The process ran and exited with a non-zero code.
    #[error("exited with status {0}")]
    Exit(i32),

    /// The process was terminated by a signal.
    #[error("was terminated by a signal")]
    Signal,

    /// The process could not be spawned (typically not on PATH).
    #[error("failed to start: {0}")]
    Launch(#[source] io::Error),
}

impl ShimError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an error from a finished process status.
    pub fn from_status(tool: &str, status: ExitStatus) -> Self {
        let failure = match status.code() {
            Some(code) => ToolFailure::Exit(code),
            None => ToolFailure::Signal,
        };
        Self::ExternalTool {
            tool: tool.to_string(),
            failure,
        }
    }

    /// Build an error from a failed spawn.
    pub fn launch(tool: &str, source: io::Error) -> Self {
        Self::ExternalTool {
            tool: tool.to_string(),
            failure: ToolFailure::Launch(source),
        }
    }

    /// Name of the external tool, if this is a tool failure.
    pub fn tool(&self) -> Option<&str> {
        match self {
            Self::ExternalTool { tool, .. } => Some(tool),
            _ => None,
        }
    }
}

/// Attach a path to `io::Result` values.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| ShimError::io(path, e))
    }
}
