//! Target vocabulary and toolchain catalog for mobkit.
//!
//! Describes the closed set of mobile targets a build can produce:
//! - **Architectures:** the CPU families mobkit compiles for
//! - **Operating systems:** the target OS and the host OS running the build
//! - **Catalog:** the bundled Android NDK toolchains, gated by build-tool version

pub mod arch;
pub mod catalog;
pub mod error;
pub mod version;

pub use arch::{arch_flag, Arch, HostOs, TargetOs};
pub use catalog::{ToolchainCatalog, ToolchainEntry, NDK_VERSION};
pub use error::{Result, TargetError};
pub use version::BuildToolVersion;
