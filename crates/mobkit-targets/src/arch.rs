//! Architecture and operating system vocabulary.
//!
//! Identifiers here are the strings written into `TARGET_ARCH` and
//! `TARGET_OS` overrides, so they are fixed at release time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;

/// A CPU architecture mobkit can compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Arch {
    /// 32-bit ARM (ARMv7).
    #[serde(rename = "arm")]
    Arm,
    /// 64-bit ARM.
    #[serde(rename = "arm64")]
    Arm64,
    /// 32-bit x86.
    #[serde(rename = "x86")]
    X86,
    /// 64-bit x86.
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Arch {
    /// Every architecture, in catalog order.
    pub const ALL: [Arch; 4] = [Arch::Arm, Arch::Arm64, Arch::X86, Arch::X86_64];

    /// The identifier used in `TARGET_ARCH`.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }

    /// The `-arch` value clang expects for this architecture.
    pub fn clang_flag(self) -> &'static str {
        match self {
            Arch::Arm => "armv7",
            Arch::Arm64 => "arm64",
            Arch::X86 => "i386",
            Arch::X86_64 => "x86_64",
        }
    }

    /// ARM ABI revision override, needed only for 32-bit ARM.
    pub fn arm_revision(self) -> Option<&'static str> {
        match self {
            Arch::Arm => Some("7"),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| TargetError::UnknownArchitecture(s.to_string()))
    }
}

/// Map an architecture identifier to clang's `-arch` vocabulary.
///
/// # Panics
///
/// Panics on an identifier outside the supported set. Catalog-driven callers
/// never reach this; use [`Arch::clang_flag`] when holding an [`Arch`].
pub fn arch_flag(arch: &str) -> &'static str {
    match arch.parse::<Arch>() {
        Ok(a) => a.clang_flag(),
        Err(_) => panic!("unknown architecture: {arch:?}"),
    }
}

/// Operating system a build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Android,
    Ios,
}

impl TargetOs {
    /// The identifier used in `TARGET_OS`.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetOs::Android => "android",
            TargetOs::Ios => "ios",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(TargetOs::Android),
            "ios" => Ok(TargetOs::Ios),
            other => Err(TargetError::UnknownOs(other.to_string())),
        }
    }
}

/// Operating system running the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl HostOs {
    /// Detect the host this process is running on.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            "windows" => HostOs::Windows,
            _ => HostOs::Other,
        }
    }

    /// Suffix appended to executable names.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            HostOs::Windows => ".exe",
            _ => "",
        }
    }

    /// Whether environment variable names compare case-insensitively.
    pub fn case_insensitive_env(self) -> bool {
        self == HostOs::Windows
    }

    /// Whether the Xcode command-line tools can exist on this host.
    pub fn has_xcode(self) -> bool {
        self == HostOs::MacOs
    }
}
