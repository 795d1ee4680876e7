//! Version of the running build tool.
//!
//! Catalog entries are gated on the semantic version, while installed
//! toolchains are checked against the exact descriptor bytes.

use std::fmt;

use semver::Version;

/// The running build tool's version and its descriptor string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildToolVersion {
    version: Version,
    descriptor: String,
}

impl BuildToolVersion {
    /// Wrap a version, deriving the descriptor written by the installer.
    pub fn new(version: Version) -> Self {
        let descriptor = format!("mobkit version {version}");
        Self { version, descriptor }
    }

    /// The version this crate was compiled as.
    pub fn current() -> Self {
        let version = Version::parse(env!("CARGO_PKG_VERSION"))
            .expect("CARGO_PKG_VERSION is valid semver");
        Self::new(version)
    }

    /// The semantic version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The descriptor compared against an installation record.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Whether a feature introduced at `min` is available.
    pub fn satisfies(&self, min: &Version) -> bool {
        *min <= self.version
    }

    /// Exact, unparsed comparison against a recorded descriptor.
    pub fn matches_record(&self, record: &[u8]) -> bool {
        record == self.descriptor.as_bytes()
    }
}

impl fmt::Display for BuildToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}
