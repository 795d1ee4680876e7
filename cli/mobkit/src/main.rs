//! mobkit CLI — cross-compilation environments for mobile targets.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{BuildFlags, MobkitConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "mobkit", version, about = "Mobile cross-compilation toolchain environments")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build environment of each target
    Env {
        #[command(flatten)]
        flags: BuildFlags,
        /// Only this target (e.g., android/arm, ios/arm64)
        #[arg(long)]
        target: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
        /// Print the full merged process environment instead of overrides
        #[arg(long)]
        merged: bool,
    },
    /// Inspect supported targets
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// Check toolchain installation status
    Doctor {
        /// Toolchain install root (default: derived from the executable)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// List supported targets
    List,
    /// Show details of a target
    Describe {
        /// Target name as <os>/<arch>
        name: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Env {
            flags,
            target,
            format,
            merged,
        } => {
            let (config, config_dir) = match MobkitConfig::find_and_load(&cwd)? {
                Some((config, dir)) => {
                    debug!(dir = %dir.display(), "loaded {CONFIG_FILE}");
                    (config, dir)
                }
                None => (MobkitConfig::default(), cwd),
            };
            let options = config.build_options(&config_dir, &flags);
            commands::env::run(options, target.as_deref(), format.as_deref(), merged)
        }

        Commands::Target { action } => match action {
            TargetAction::List => commands::target::list(),
            TargetAction::Describe { name } => commands::target::describe(&name),
        },

        Commands::Doctor { root } => commands::doctor::run(root.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn env_flags_parse() {
        let cli = Cli::try_parse_from([
            "mobkit", "env", "-n", "-x", "--work", "--root", "/opt/pkg/mobkit", "--target",
            "android/arm",
        ])
        .unwrap();
        match cli.command {
            Commands::Env { flags, target, .. } => {
                assert!(flags.dry_run && flags.trace && flags.work);
                assert_eq!(flags.root, Some(PathBuf::from("/opt/pkg/mobkit")));
                assert_eq!(target.as_deref(), Some("android/arm"));
            }
            _ => panic!("expected env command"),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["mobkit", "-vv", "target", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
