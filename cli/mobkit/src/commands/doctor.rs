//! `mobkit doctor` — toolchain diagnostics.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use mobkit_env::workspace::{check_installation, install_root_from_exe};
use mobkit_targets::{BuildToolVersion, HostOs, ToolchainCatalog};

/// Print toolchain diagnostic information.
pub fn run(root: Option<&Path>) -> Result<()> {
    let version = BuildToolVersion::current();
    let host = HostOs::current();

    println!("=== mobkit doctor ===");
    println!();
    println!("Version: {version}");
    println!("Host:    {host:?}");
    println!();

    println!("--- Toolchain ---");
    let root: Option<PathBuf> = match root {
        Some(root) => Some(root.to_path_buf()),
        None => std::env::current_exe()
            .ok()
            .and_then(|exe| install_root_from_exe(&exe)),
    };
    match root {
        Some(root) if root.is_dir() => {
            println!("  Install root: {}", root.display());
            match check_installation(&root, &version) {
                Ok(()) => println!("  Record:       up to date"),
                Err(e) => println!("  Record:       {e}"),
            }
            let catalog = ToolchainCatalog::new(&root, version.clone(), host);
            for entry in catalog.available() {
                let gcc = catalog.tool_path(entry, "gcc");
                println!(
                    "  android/{:<8} {}",
                    entry.arch.as_str(),
                    if gcc.is_file() { "ok" } else { "missing compiler" }
                );
            }
        }
        Some(root) => println!("  Install root: {} (not installed)", root.display()),
        None => println!("  Install root: unknown (executable is not in a bin directory)"),
    }
    println!();

    println!("--- Xcode ---");
    if host.has_xcode() {
        print_tool_status("xcrun", &["--version"]);
    } else {
        println!("  skipped (iOS targets require a macOS host)");
    }

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn doctor_runs_without_install() {
        let dir = tempfile::tempdir().unwrap();
        super::run(Some(&dir.path().join("missing"))).unwrap();
    }

    #[test]
    fn doctor_reports_stale_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("version"), "mobkit version 0.0.1").unwrap();
        super::run(Some(dir.path())).unwrap();
    }
}
