//! Error types for target and catalog lookups.

/// Errors that can occur while resolving targets.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Architecture is missing from the catalog or gated out by version.
    #[error("unsupported architecture: {arch}")]
    UnsupportedArchitecture {
        /// The architecture identifier that was requested.
        arch: String,
    },

    /// Architecture identifier could not be parsed.
    #[error("unknown architecture '{0}' (expected one of: arm, arm64, x86, x86_64)")]
    UnknownArchitecture(String),

    /// Operating system identifier could not be parsed.
    #[error("unknown target OS '{0}' (expected one of: android, ios)")]
    UnknownOs(String),
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
