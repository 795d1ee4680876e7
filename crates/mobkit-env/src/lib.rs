//! Cross-compilation environment construction for mobkit builds.
//!
//! Turns an installed toolchain into per-target override environments:
//! - [`workspace`] validates the installation and allocates the work directory
//! - [`builder`] assembles `KEY=VALUE` overrides for every buildable target
//! - [`locator`] discovers Xcode SDKs for the iOS family
//! - [`merge`] layers overrides on top of the inherited process environment

pub mod builder;
pub mod error;
pub mod locator;
pub mod merge;
pub mod options;
pub mod workspace;

pub use builder::{BuildEnvironment, EnvironmentBuilder, TargetEnvironment};
pub use error::{EnvError, Result};
pub use locator::{DiscoveredSdk, PlaceholderLocator, SdkLocator, SdkVariant, XcrunLocator};
pub use merge::{environ, lookup, merge_with};
pub use options::BuildOptions;
pub use workspace::{BuildWorkspace, Workspace};
