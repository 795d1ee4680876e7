//! Build workspace initialization.
//!
//! Locates the installed toolchain next to the running executable, checks it
//! was installed by this exact tool version, allocates the work directory,
//! and builds every target environment. Nothing is allocated until the
//! installation checks pass.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mobkit_targets::{BuildToolVersion, HostOs, ToolchainCatalog};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::builder::{BuildEnvironment, EnvironmentBuilder};
use crate::error::{EnvError, Result};
use crate::locator::{PlaceholderLocator, SdkLocator, XcrunLocator};
use crate::options::BuildOptions;

/// Name of the installation record under the install root.
pub const VERSION_FILE: &str = "version";

/// Path printed for the work directory in dry runs.
pub const WORK_PLACEHOLDER: &str = "$WORK";

/// Scratch directory for assembling build outputs.
#[derive(Debug)]
pub enum Workspace {
    /// A real temporary directory, removed on cleanup unless `keep` is set.
    Temp { dir: TempDir, keep: bool },
    /// Dry-run stand-in; nothing exists on disk.
    Placeholder,
}

impl Workspace {
    fn allocate(options: &BuildOptions) -> Result<Self> {
        if options.dry_run {
            return Ok(Workspace::Placeholder);
        }
        let mut builder = tempfile::Builder::new();
        builder.prefix("mobkit-work-");
        let dir = match &options.work_parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "allocated workspace");
        Ok(Workspace::Temp {
            dir,
            keep: options.keep_work,
        })
    }

    /// Location of the workspace, `$WORK` for dry runs.
    pub fn path(&self) -> &Path {
        match self {
            Workspace::Temp { dir, .. } => dir.path(),
            Workspace::Placeholder => Path::new(WORK_PLACEHOLDER),
        }
    }

    /// Remove the workspace, or print and keep it when requested.
    pub fn cleanup(self) -> Result<()> {
        match self {
            Workspace::Temp { dir, keep: true } => {
                let path = dir.keep();
                warn!(path = %path.display(), "keeping workspace");
                println!("WORK={}", path.display());
                Ok(())
            }
            Workspace::Temp { dir, keep: false } => {
                debug!(path = %dir.path().display(), "removing workspace");
                dir.close()?;
                Ok(())
            }
            Workspace::Placeholder => Ok(()),
        }
    }
}

/// Derive the install root from the executable path.
///
/// `<prefix>/bin/mobkit` installs its toolchain under `<prefix>/pkg/mobkit`.
/// Returns `None` when the executable is not directly inside a `bin`
/// directory.
pub fn install_root_from_exe(exe: &Path) -> Option<PathBuf> {
    let stem = exe.file_stem()?;
    let bin = exe.parent()?;
    if bin.file_name() != Some(OsStr::new("bin")) {
        return None;
    }
    Some(bin.parent()?.join("pkg").join(stem))
}

fn resolve_install_root(options: &BuildOptions, exe: io::Result<PathBuf>) -> Result<PathBuf> {
    let root = match &options.install_root {
        Some(root) => root.clone(),
        None => {
            let exe = exe.map_err(|e| EnvError::ToolchainNotInstalled {
                reason: format!("cannot locate the mobkit executable: {e}"),
            })?;
            install_root_from_exe(&exe).ok_or_else(|| EnvError::ToolchainNotInstalled {
                reason: format!("{} is not in a bin directory", exe.display()),
            })?
        }
    };

    if !root.is_dir() {
        return Err(EnvError::ToolchainNotInstalled {
            reason: format!("{} does not exist", root.display()),
        });
    }
    Ok(root)
}

/// Check the installation record under `root` matches `version` exactly.
pub fn check_installation(root: &Path, version: &BuildToolVersion) -> Result<()> {
    let path = root.join(VERSION_FILE);
    let record = fs::read(&path)
        .map_err(|source| EnvError::ToolchainPartiallyInstalled { path, source })?;
    if !version.matches_record(&record) {
        return Err(EnvError::ToolchainOutOfDate {
            installed: String::from_utf8_lossy(&record).trim().to_string(),
            expected: version.descriptor().to_string(),
        });
    }
    Ok(())
}

/// An initialized build: validated toolchain, work directory, and the
/// environment of every target buildable on this host.
#[derive(Debug)]
pub struct BuildWorkspace {
    options: BuildOptions,
    catalog: ToolchainCatalog,
    environment: BuildEnvironment,
    workspace: Workspace,
}

impl BuildWorkspace {
    /// Initialize for the current host and executable.
    pub fn init(options: BuildOptions, version: BuildToolVersion) -> Result<Self> {
        Self::init_on(options, version, HostOs::current(), std::env::current_exe())
    }

    /// Initialize as if running on `host` from executable `exe`.
    pub fn init_on(
        options: BuildOptions,
        version: BuildToolVersion,
        host: HostOs,
        exe: io::Result<PathBuf>,
    ) -> Result<Self> {
        let root = resolve_install_root(&options, exe)?;
        info!(root = %root.display(), "found toolchain");

        if options.dry_run {
            debug!("dry run, skipping installation record check");
        } else {
            check_installation(&root, &version)?;
        }

        let workspace = Workspace::allocate(&options)?;
        let catalog = ToolchainCatalog::new(root, version, host);

        let locator: Box<dyn SdkLocator> = if options.dry_run {
            Box::new(PlaceholderLocator)
        } else {
            Box::new(XcrunLocator::new())
        };
        let environment =
            EnvironmentBuilder::new(&catalog, locator.as_ref(), &options.simulator_min_version)
                .build()?;

        let build = Self {
            options,
            catalog,
            environment,
            workspace,
        };
        if build.options.print_trace() {
            build.write_trace(&mut io::stderr().lock())?;
        }
        Ok(build)
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn install_root(&self) -> &Path {
        self.catalog.install_root()
    }

    pub fn catalog(&self) -> &ToolchainCatalog {
        &self.catalog
    }

    pub fn environment(&self) -> &BuildEnvironment {
        &self.environment
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Write the resolved install root, work directory, and every target's
    /// overrides.
    pub fn write_trace(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "MOBKIT={}", self.install_root().display())?;
        writeln!(out, "WORK={}", self.workspace.path().display())?;
        for target in self.environment.targets() {
            writeln!(out, "# {}/{}", target.os, target.arch)?;
            for var in &target.vars {
                writeln!(out, "{var}")?;
            }
        }
        Ok(())
    }

    /// Release the work directory.
    pub fn cleanup(self) -> Result<()> {
        self.workspace.cleanup()
    }
}
