//! Xcode SDK discovery for the iOS family.
//!
//! iOS compilers are not bundled; they are found through `xcrun` from the
//! separately installed Xcode command-line tools. Dry runs swap in
//! [`PlaceholderLocator`] so the rest of the pipeline runs without Xcode.

use std::ffi::OsString;
use std::process::Command;

use mobkit_targets::Arch;
use serde::Serialize;
use tracing::debug;

use crate::error::{EnvError, Result};

/// Device or simulator flavor of the iOS SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkVariant {
    Device,
    Simulator,
}

impl SdkVariant {
    pub const ALL: [SdkVariant; 2] = [SdkVariant::Device, SdkVariant::Simulator];

    /// Name passed to `xcrun --sdk`.
    pub fn sdk_name(self) -> &'static str {
        match self {
            SdkVariant::Device => "iphoneos",
            SdkVariant::Simulator => "iphonesimulator",
        }
    }

    /// Architectures built against this SDK.
    pub fn archs(self) -> [Arch; 2] {
        match self {
            SdkVariant::Device => [Arch::Arm, Arch::Arm64],
            SdkVariant::Simulator => [Arch::X86, Arch::X86_64],
        }
    }
}

/// Compiler and sysroot flags found for one SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredSdk {
    /// Path of the SDK's clang.
    pub compiler: String,
    /// Flags pointing the compiler at the SDK root.
    pub sysroot_flags: String,
}

/// Finds the compiler and SDK root for a named Xcode SDK.
pub trait SdkLocator {
    fn locate(&self, sdk: &str) -> Result<DiscoveredSdk>;
}

/// Deterministic stand-in used by dry runs. Never spawns a process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLocator;

impl SdkLocator for PlaceholderLocator {
    fn locate(&self, sdk: &str) -> Result<DiscoveredSdk> {
        Ok(DiscoveredSdk {
            compiler: format!("clang-{sdk}"),
            sysroot_flags: format!("-isysroot={sdk}"),
        })
    }
}

/// Locator backed by the `xcrun` command.
#[derive(Debug, Clone)]
pub struct XcrunLocator {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for XcrunLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl XcrunLocator {
    pub fn new() -> Self {
        Self::with_command("xcrun", Vec::<OsString>::new())
    }

    /// Use `program` with `leading_args` in place of `xcrun`.
    pub fn with_command(
        program: impl Into<OsString>,
        leading_args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("xcrun {}", args.join(" "));
        debug!(%command, "running SDK locator");

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .output()
            .map_err(|e| EnvError::ToolchainDiscovery {
                command: command.clone(),
                status: e.to_string(),
                output: String::new(),
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(EnvError::ToolchainDiscovery {
                command,
                status: output.status.to_string(),
                output: combined,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SdkLocator for XcrunLocator {
    fn locate(&self, sdk: &str) -> Result<DiscoveredSdk> {
        let compiler = self.run(&["--sdk", sdk, "--find", "clang"])?;
        let sdk_path = self.run(&["--sdk", sdk, "--show-sdk-path"])?;
        debug!(sdk, %compiler, %sdk_path, "located SDK");
        Ok(DiscoveredSdk {
            compiler,
            sysroot_flags: format!("-isysroot {sdk_path}"),
        })
    }
}
