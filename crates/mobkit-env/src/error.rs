//! Error types for environment construction.

use std::path::PathBuf;

use mobkit_targets::TargetError;

/// Errors that can occur while preparing a build environment.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// No toolchain under the expected install root.
    #[error("toolchain not installed ({reason}); install it before building")]
    ToolchainNotInstalled {
        /// What was missing.
        reason: String,
    },

    /// The installation record does not match the running tool.
    #[error("toolchain out of date (installed by '{installed}', running '{expected}'); reinstall it")]
    ToolchainOutOfDate {
        /// Lossy rendering of the installation record.
        installed: String,
        /// Descriptor of the running tool.
        expected: String,
    },

    /// The installation record could not be read.
    #[error("toolchain partially installed ({}: {source}); reinstall it", path.display())]
    ToolchainPartiallyInstalled {
        /// Path of the installation record.
        path: PathBuf,
        /// Underlying read failure.
        source: std::io::Error,
    },

    /// The SDK locator failed.
    #[error("{command}: {status}\n{output}")]
    ToolchainDiscovery {
        /// Command line that was run.
        command: String,
        /// Exit status or spawn failure.
        status: String,
        /// Combined stdout and stderr of the command.
        output: String,
    },

    /// Target lookup failure.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// I/O error allocating or removing the workspace.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for environment operations.
pub type Result<T> = std::result::Result<T, EnvError>;
