//! `mobkit.toml` configuration and build flag resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use mobkit_env::BuildOptions;
use serde::{Deserialize, Serialize};

/// File name searched for from the current directory upward.
pub const CONFIG_FILE: &str = "mobkit.toml";

/// The top-level configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MobkitConfig {
    /// Toolchain location section.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// iOS build settings.
    #[serde(default)]
    pub ios: IosConfig,
}

/// Toolchain location section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Install root, relative to the config file's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Parent directory for work directories.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

/// iOS build settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IosConfig {
    /// Minimum iOS version for simulator builds.
    #[serde(default)]
    pub simulator_min_version: Option<String>,
}

/// Flags shared by commands that initialize a build workspace.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildFlags {
    /// Print the commands and environment but do not run external tools
    #[arg(short = 'n')]
    pub dry_run: bool,
    /// Print the resolved toolchain paths and environments
    #[arg(short = 'x')]
    pub trace: bool,
    /// Keep the work directory and print its path
    #[arg(long)]
    pub work: bool,
    /// Toolchain install root (default: derived from the executable)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl MobkitConfig {
    /// Search upward from `start_dir` for `mobkit.toml`, returning it with
    /// the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: MobkitConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a config from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing mobkit.toml")
    }

    /// Combine the file settings with command-line flags; flags win.
    pub fn build_options(&self, config_dir: &Path, flags: &BuildFlags) -> BuildOptions {
        let defaults = BuildOptions::default();
        BuildOptions {
            dry_run: flags.dry_run,
            trace: flags.trace,
            keep_work: flags.work,
            install_root: flags
                .root
                .clone()
                .or_else(|| self.toolchain.root.as_ref().map(|r| config_dir.join(r))),
            work_parent: self.toolchain.work_dir.as_ref().map(|w| config_dir.join(w)),
            simulator_min_version: self
                .ios
                .simulator_min_version
                .clone()
                .unwrap_or(defaults.simulator_min_version),
        }
    }
}
