//! Per-target override environments.
//!
//! Android targets come from the bundled NDK catalog. iOS targets are
//! discovered through an [`SdkLocator`] and are only built on macOS hosts.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mobkit_targets::{Arch, TargetOs, ToolchainCatalog};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::locator::{SdkLocator, SdkVariant};
use crate::merge::{environ, lookup};

/// Override keys understood by the compile step.
pub mod keys {
    pub const TARGET_OS: &str = "TARGET_OS";
    pub const TARGET_ARCH: &str = "TARGET_ARCH";
    /// ARM ABI revision, set for 32-bit ARM only.
    pub const TARGET_ARM: &str = "TARGET_ARM";
    pub const CC: &str = "CC";
    pub const CXX: &str = "CXX";
    pub const CFLAGS: &str = "CFLAGS";
    pub const LDFLAGS: &str = "LDFLAGS";
    /// Enables calls into native code.
    pub const NATIVE_INTEROP: &str = "NATIVE_INTEROP";
}

/// Overrides for one (OS, architecture) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEnvironment {
    pub os: TargetOs,
    pub arch: Arch,
    /// `KEY=VALUE` overrides, in the order they were assembled.
    pub vars: Vec<String>,
    /// Symbol table tool for inspecting this target's objects.
    pub nm: PathBuf,
}

impl TargetEnvironment {
    /// Value of `key` in the overrides, or `""` when unset.
    pub fn get(&self, key: &str) -> &str {
        lookup(&self.vars, key).to_str().unwrap_or_default()
    }

    /// Directory holding this target's compiled packages.
    pub fn pkg_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join(format!("pkg_{}_{}", self.os, self.arch))
    }

    /// The inherited process environment with these overrides applied.
    pub fn merged(&self) -> Vec<OsString> {
        environ(&self.vars)
    }
}

/// Every target environment the host can build, read-only once built.
#[derive(Debug, Clone, Default)]
pub struct BuildEnvironment {
    targets: BTreeMap<(TargetOs, Arch), TargetEnvironment>,
}

impl BuildEnvironment {
    /// Environment for `os`/`arch`, if it was built on this host.
    pub fn get(&self, os: TargetOs, arch: Arch) -> Option<&TargetEnvironment> {
        self.targets.get(&(os, arch))
    }

    /// All environments, ordered by OS then architecture.
    pub fn targets(&self) -> impl Iterator<Item = &TargetEnvironment> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn insert(&mut self, env: TargetEnvironment) {
        self.targets.insert((env.os, env.arch), env);
    }
}

/// Assembles [`TargetEnvironment`]s from the catalog and an SDK locator.
pub struct EnvironmentBuilder<'a> {
    catalog: &'a ToolchainCatalog,
    locator: &'a dyn SdkLocator,
    simulator_min_version: &'a str,
}

impl<'a> EnvironmentBuilder<'a> {
    pub fn new(
        catalog: &'a ToolchainCatalog,
        locator: &'a dyn SdkLocator,
        simulator_min_version: &'a str,
    ) -> Self {
        Self {
            catalog,
            locator,
            simulator_min_version,
        }
    }

    /// Build environments for every target the host supports.
    ///
    /// iOS targets are skipped without error when the host cannot run Xcode.
    pub fn build(&self) -> Result<BuildEnvironment> {
        let mut env = BuildEnvironment::default();
        self.build_android(&mut env);

        if self.catalog.host().has_xcode() {
            self.build_ios(&mut env)?;
        } else {
            debug!(host = ?self.catalog.host(), "skipping iOS targets");
        }

        info!(targets = env.len(), "built target environments");
        Ok(env)
    }

    fn build_android(&self, env: &mut BuildEnvironment) {
        for entry in self.catalog.available() {
            let cc = self.catalog.tool_path(entry, "gcc");
            let cxx = self.catalog.tool_path(entry, "g++");
            let mut vars = vec![
                format!("{}=android", keys::TARGET_OS),
                format!("{}={}", keys::TARGET_ARCH, entry.arch),
                format!("{}={}", keys::CC, cc.display()),
                format!("{}={}", keys::CXX, cxx.display()),
                format!("{}=1", keys::NATIVE_INTEROP),
            ];
            if let Some(rev) = entry.arch.arm_revision() {
                vars.push(format!("{}={rev}", keys::TARGET_ARM));
            }
            debug!(arch = %entry.arch, cc = %cc.display(), "android toolchain");
            env.insert(TargetEnvironment {
                os: TargetOs::Android,
                arch: entry.arch,
                vars,
                nm: self.catalog.tool_path(entry, "nm"),
            });
        }
    }

    fn build_ios(&self, env: &mut BuildEnvironment) -> Result<()> {
        for variant in SdkVariant::ALL {
            let sdk = self.locator.locate(variant.sdk_name())?;
            let mut base_flags = sdk.sysroot_flags.clone();
            if variant == SdkVariant::Simulator {
                base_flags.push_str(" -mios-simulator-version-min=");
                base_flags.push_str(self.simulator_min_version);
            }

            for arch in variant.archs() {
                let flags = format!("{base_flags} -arch {}", arch.clang_flag());
                let mut vars = vec![
                    format!("{}=ios", keys::TARGET_OS),
                    format!("{}={arch}", keys::TARGET_ARCH),
                ];
                if let Some(rev) = arch.arm_revision() {
                    vars.push(format!("{}={rev}", keys::TARGET_ARM));
                }
                vars.extend([
                    format!("{}={}", keys::CC, sdk.compiler),
                    format!("{}={}", keys::CXX, sdk.compiler),
                    format!("{}={flags}", keys::CFLAGS),
                    format!("{}={flags}", keys::LDFLAGS),
                    format!("{}=1", keys::NATIVE_INTEROP),
                ]);
                env.insert(TargetEnvironment {
                    os: TargetOs::Ios,
                    arch,
                    vars,
                    nm: PathBuf::from("nm"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use mobkit_targets::{BuildToolVersion, HostOs};
    use semver::Version;

    use super::*;
    use crate::error::EnvError;
    use crate::locator::{DiscoveredSdk, PlaceholderLocator};

    /// Records every SDK it is asked for.
    #[derive(Default)]
    struct RecordingLocator {
        calls: RefCell<Vec<String>>,
    }

    impl SdkLocator for RecordingLocator {
        fn locate(&self, sdk: &str) -> Result<DiscoveredSdk> {
            self.calls.borrow_mut().push(sdk.to_string());
            Ok(DiscoveredSdk {
                compiler: "/xc/clang".into(),
                sysroot_flags: format!("-isysroot /xc/{sdk}.sdk"),
            })
        }
    }

    struct FailingLocator;

    impl SdkLocator for FailingLocator {
        fn locate(&self, sdk: &str) -> Result<DiscoveredSdk> {
            Err(EnvError::ToolchainDiscovery {
                command: format!("xcrun --sdk {sdk} --find clang"),
                status: "exit status: 1".into(),
                output: "no developer tools".into(),
            })
        }
    }

    fn catalog(host: HostOs) -> ToolchainCatalog {
        ToolchainCatalog::new("/pkg/mobkit", BuildToolVersion::new(Version::new(0, 1, 0)), host)
    }

    #[test]
    fn android_overrides() {
        let catalog = catalog(HostOs::Linux);
        let env = EnvironmentBuilder::new(&catalog, &PlaceholderLocator, "6.1")
            .build()
            .unwrap();

        let arm = env.get(TargetOs::Android, Arch::Arm).unwrap();
        assert_eq!(
            arm.vars,
            vec![
                "TARGET_OS=android",
                "TARGET_ARCH=arm",
                "CC=/pkg/mobkit/android-ndk-r10e/arm/bin/arm-linux-androideabi-gcc",
                "CXX=/pkg/mobkit/android-ndk-r10e/arm/bin/arm-linux-androideabi-g++",
                "NATIVE_INTEROP=1",
                "TARGET_ARM=7",
            ]
        );
        assert_eq!(
            arm.nm,
            PathBuf::from("/pkg/mobkit/android-ndk-r10e/arm/bin/arm-linux-androideabi-nm")
        );

        let arm64 = env.get(TargetOs::Android, Arch::Arm64).unwrap();
        assert_eq!(arm64.get(keys::TARGET_ARM), "");
        assert_eq!(arm64.get(keys::TARGET_ARCH), "arm64");
    }

    #[test]
    fn version_gated_android_targets_are_absent() {
        let catalog = catalog(HostOs::Linux);
        let env = EnvironmentBuilder::new(&catalog, &PlaceholderLocator, "6.1")
            .build()
            .unwrap();
        assert!(env.get(TargetOs::Android, Arch::X86).is_none());
        assert!(env.get(TargetOs::Android, Arch::X86_64).is_none());
    }

    #[test]
    fn ios_skipped_off_macos() {
        let catalog = catalog(HostOs::Linux);
        let locator = RecordingLocator::default();
        let env = EnvironmentBuilder::new(&catalog, &locator, "6.1")
            .build()
            .unwrap();
        assert!(locator.calls.borrow().is_empty());
        assert!(env.targets().all(|t| t.os == TargetOs::Android));
    }

    #[test]
    fn ios_one_lookup_per_variant() {
        let catalog = catalog(HostOs::MacOs);
        let locator = RecordingLocator::default();
        let env = EnvironmentBuilder::new(&catalog, &locator, "6.1")
            .build()
            .unwrap();
        assert_eq!(*locator.calls.borrow(), vec!["iphoneos", "iphonesimulator"]);
        for arch in Arch::ALL {
            assert!(env.get(TargetOs::Ios, arch).is_some(), "missing ios/{arch}");
        }
        assert_eq!(env.len(), 6);
    }

    #[test]
    fn ios_device_and_simulator_flags() {
        let catalog = catalog(HostOs::MacOs);
        let locator = RecordingLocator::default();
        let env = EnvironmentBuilder::new(&catalog, &locator, "7.0")
            .build()
            .unwrap();

        let arm = env.get(TargetOs::Ios, Arch::Arm).unwrap();
        assert_eq!(arm.get(keys::TARGET_ARM), "7");
        assert_eq!(arm.get(keys::CC), "/xc/clang");
        assert_eq!(arm.get(keys::CXX), "/xc/clang");
        assert_eq!(arm.get(keys::CFLAGS), "-isysroot /xc/iphoneos.sdk -arch armv7");
        assert_eq!(arm.get(keys::LDFLAGS), arm.get(keys::CFLAGS));
        assert_eq!(arm.nm, PathBuf::from("nm"));

        let sim = env.get(TargetOs::Ios, Arch::X86_64).unwrap();
        assert_eq!(
            sim.get(keys::CFLAGS),
            "-isysroot /xc/iphonesimulator.sdk -mios-simulator-version-min=7.0 -arch x86_64"
        );
        assert_eq!(sim.get(keys::TARGET_ARM), "");

        let i386 = env.get(TargetOs::Ios, Arch::X86).unwrap();
        assert!(i386.get(keys::LDFLAGS).ends_with("-arch i386"));
    }

    #[test]
    fn discovery_failure_propagates() {
        let catalog = catalog(HostOs::MacOs);
        let err = EnvironmentBuilder::new(&catalog, &FailingLocator, "6.1")
            .build()
            .unwrap_err();
        assert!(matches!(err, EnvError::ToolchainDiscovery { .. }));
    }

    #[test]
    fn pkg_dir_layout() {
        let catalog = catalog(HostOs::Linux);
        let env = EnvironmentBuilder::new(&catalog, &PlaceholderLocator, "6.1")
            .build()
            .unwrap();
        let arm = env.get(TargetOs::Android, Arch::Arm).unwrap();
        assert_eq!(
            arm.pkg_dir(Path::new("/pkg/mobkit")),
            PathBuf::from("/pkg/mobkit/pkg_android_arm")
        );
    }
}
