//! `mobkit target` — supported target listing and description.

use std::path::PathBuf;

use anyhow::Result;
use mobkit_env::SdkVariant;
use mobkit_targets::{BuildToolVersion, HostOs, TargetOs, ToolchainCatalog, NDK_VERSION};

use crate::commands::env::parse_target;

fn catalog() -> ToolchainCatalog {
    ToolchainCatalog::new(PathBuf::new(), BuildToolVersion::current(), HostOs::current())
}

/// List every target with its availability on this host.
pub fn list() -> Result<()> {
    let catalog = catalog();
    let xcode = catalog.host().has_xcode();

    println!("Android (bundled android-{NDK_VERSION}):");
    for entry in catalog.entries() {
        let status = if catalog.is_available(entry) {
            "available".to_string()
        } else {
            format!("requires mobkit >= {}", entry.min_version)
        };
        println!(
            "  android/{:<8} {:<13} {:<12} {}",
            entry.arch.as_str(),
            entry.abi,
            entry.platform,
            status
        );
    }
    println!();

    println!("iOS (Xcode SDKs):");
    for variant in SdkVariant::ALL {
        for arch in variant.archs() {
            println!(
                "  ios/{:<12} {:<15} {}",
                arch.as_str(),
                variant.sdk_name(),
                if xcode { "available" } else { "requires a macOS host" }
            );
        }
    }
    println!();
    println!("Use 'mobkit target describe <os>/<arch>' for details.");
    Ok(())
}

/// Describe a single target.
pub fn describe(name: &str) -> Result<()> {
    let (os, arch) = parse_target(name)?;
    let catalog = catalog();

    println!("=== Target: {os}/{arch} ===");
    println!("  Clang arch: {}", arch.clang_flag());
    if let Some(rev) = arch.arm_revision() {
        println!("  ARM revision: {rev}");
    }

    match os {
        TargetOs::Android => {
            let entry = catalog.toolchain(arch)?;
            println!("  ABI:        {}", entry.abi);
            println!("  Platform:   {}", entry.platform);
            println!("  Compiler:   {}", entry.compiler_package);
            println!("  Prefix:     {}", entry.tool_prefix);
            println!("  Since:      mobkit {}", entry.min_version);
        }
        TargetOs::Ios => {
            let variant = SdkVariant::ALL
                .into_iter()
                .find(|v| v.archs().contains(&arch))
                .unwrap_or(SdkVariant::Device);
            println!("  SDK:        {}", variant.sdk_name());
            println!(
                "  Host:       {}",
                if catalog.host().has_xcode() {
                    "supported"
                } else {
                    "unsupported (requires macOS)"
                }
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_runs() {
        list().unwrap();
    }

    #[test]
    fn describe_known_targets() {
        assert!(describe("android/arm").is_ok());
        assert!(describe("ios/x86").is_ok());
    }

    #[test]
    fn describe_gated_target_fails() {
        let err = describe("android/x86").unwrap_err();
        assert!(err.to_string().contains("unsupported architecture"));
    }

    #[test]
    fn describe_unknown_target() {
        assert!(describe("nonexistent").is_err());
        assert!(describe("android/sparc").is_err());
    }
}
