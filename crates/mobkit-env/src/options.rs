//! Options controlling workspace initialization.

use std::path::PathBuf;

/// Default `-mios-simulator-version-min` for simulator builds.
pub const DEFAULT_SIMULATOR_MIN_VERSION: &str = "6.1";

/// Build-wide switches, fixed before initialization starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Print commands instead of running external tools; implies `trace`.
    pub dry_run: bool,
    /// Print resolved paths and environments to stderr.
    pub trace: bool,
    /// Keep the work directory and print its path on cleanup.
    pub keep_work: bool,
    /// Use this install root instead of deriving it from the executable.
    pub install_root: Option<PathBuf>,
    /// Parent of the work directory; the system temp dir when unset.
    pub work_parent: Option<PathBuf>,
    /// Minimum iOS version passed to simulator compiles.
    pub simulator_min_version: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            trace: false,
            keep_work: false,
            install_root: None,
            work_parent: None,
            simulator_min_version: DEFAULT_SIMULATOR_MIN_VERSION.to_string(),
        }
    }
}

impl BuildOptions {
    /// Whether trace output should be printed.
    pub fn print_trace(&self) -> bool {
        self.trace || self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_implies_trace() {
        let options = BuildOptions {
            dry_run: true,
            ..BuildOptions::default()
        };
        assert!(options.print_trace());
        assert!(!BuildOptions::default().print_trace());
        assert_eq!(BuildOptions::default().simulator_min_version, "6.1");
    }
}
