//! Bundled Android NDK toolchain catalog.
//!
//! The set of toolchains is fixed per release. Each entry records where its
//! binaries live under the install root and the first build-tool version
//! that supports it; entries newer than the running tool are treated as
//! absent.

use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;

use crate::arch::{Arch, HostOs};
use crate::error::{Result, TargetError};
use crate::version::BuildToolVersion;

/// NDK release the installer unpacks under the install root.
pub const NDK_VERSION: &str = "ndk-r10e";

/// Layout and requirements of one bundled toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainEntry {
    /// Architecture this toolchain produces code for.
    pub arch: Arch,
    /// Android ABI label (e.g., "armeabi-v7a").
    pub abi: &'static str,
    /// Android platform / API level (e.g., "android-15").
    pub platform: &'static str,
    /// Compiler package label inside the NDK.
    pub compiler_package: &'static str,
    /// Directory under the NDK root holding this toolchain.
    pub dir: &'static str,
    /// Prefix of every binary name (e.g., "arm-linux-androideabi").
    pub tool_prefix: &'static str,
    /// First build-tool version supporting this toolchain.
    pub min_version: Version,
}

fn ndk_entries() -> Vec<ToolchainEntry> {
    vec![
        ToolchainEntry {
            arch: Arch::Arm,
            abi: "armeabi-v7a",
            platform: "android-15",
            compiler_package: "arm-linux-androideabi-4.8",
            dir: "arm",
            tool_prefix: "arm-linux-androideabi",
            min_version: Version::new(0, 1, 0),
        },
        ToolchainEntry {
            arch: Arch::Arm64,
            abi: "arm64-v8a",
            platform: "android-21",
            compiler_package: "aarch64-linux-android-4.9",
            dir: "arm64",
            tool_prefix: "aarch64-linux-android",
            min_version: Version::new(0, 1, 0),
        },
        ToolchainEntry {
            arch: Arch::X86,
            abi: "x86",
            platform: "android-15",
            compiler_package: "x86-4.8",
            dir: "x86",
            tool_prefix: "i686-linux-android",
            min_version: Version::new(0, 2, 0),
        },
        ToolchainEntry {
            arch: Arch::X86_64,
            abi: "x86_64",
            platform: "android-21",
            compiler_package: "x86_64-4.9",
            dir: "x86_64",
            tool_prefix: "x86_64-linux-android",
            min_version: Version::new(0, 2, 0),
        },
    ]
}

/// The NDK toolchains usable by the running build tool.
#[derive(Debug, Clone)]
pub struct ToolchainCatalog {
    install_root: PathBuf,
    version: BuildToolVersion,
    host: HostOs,
    entries: Vec<ToolchainEntry>,
}

impl ToolchainCatalog {
    /// Build the catalog for a toolchain installed under `install_root`.
    pub fn new(install_root: impl Into<PathBuf>, version: BuildToolVersion, host: HostOs) -> Self {
        Self {
            install_root: install_root.into(),
            version,
            host,
            entries: ndk_entries(),
        }
    }

    /// Directory the toolchain was installed into.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Root of the unpacked NDK.
    pub fn root(&self) -> PathBuf {
        self.install_root.join(format!("android-{NDK_VERSION}"))
    }

    /// Host the catalog resolves binary paths for.
    pub fn host(&self) -> HostOs {
        self.host
    }

    /// Running build-tool version used for gating.
    pub fn version(&self) -> &BuildToolVersion {
        &self.version
    }

    /// Look up the toolchain for `arch`.
    ///
    /// Fails when the architecture has no entry or its entry requires a newer
    /// build tool.
    pub fn toolchain(&self, arch: Arch) -> Result<&ToolchainEntry> {
        self.entries
            .iter()
            .find(|e| e.arch == arch && self.is_available(e))
            .ok_or_else(|| TargetError::UnsupportedArchitecture {
                arch: arch.to_string(),
            })
    }

    /// Whether `entry` is usable with the running build tool.
    pub fn is_available(&self, entry: &ToolchainEntry) -> bool {
        self.version.satisfies(&entry.min_version)
    }

    /// All entries, including version-gated ones.
    pub fn entries(&self) -> &[ToolchainEntry] {
        &self.entries
    }

    /// Entries usable with the running build tool, in architecture order.
    pub fn available(&self) -> impl Iterator<Item = &ToolchainEntry> {
        self.entries.iter().filter(|e| self.is_available(e))
    }

    /// Absolute path of `tool` (e.g., "gcc", "nm") in `entry`'s toolchain.
    pub fn tool_path(&self, entry: &ToolchainEntry, tool: &str) -> PathBuf {
        let name = format!("{}-{}{}", entry.tool_prefix, tool, self.host.exe_suffix());
        self.root().join(entry.dir).join("bin").join(name)
    }
}
