//! `mobkit env` — print target build environments.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mobkit_env::{BuildOptions, BuildWorkspace, TargetEnvironment};
use mobkit_targets::{Arch, BuildToolVersion, TargetOs};
use serde::Serialize;

/// Parse an `os/arch` target name such as `android/arm64`.
pub fn parse_target(name: &str) -> Result<(TargetOs, Arch)> {
    let Some((os, arch)) = name.split_once('/') else {
        bail!("invalid target '{name}', expected <os>/<arch> (e.g., android/arm)");
    };
    Ok((os.parse()?, arch.parse()?))
}

#[derive(Serialize)]
struct EnvReport<'a> {
    version: String,
    dry_run: bool,
    install_root: &'a Path,
    toolchain: PathBuf,
    work: &'a Path,
    targets: Vec<TargetReport<'a>>,
}

#[derive(Serialize)]
struct TargetReport<'a> {
    #[serde(flatten)]
    env: &'a TargetEnvironment,
    pkg_dir: PathBuf,
}

/// Initialize the workspace and print the selected environments.
pub fn run(options: BuildOptions, target: Option<&str>, format: Option<&str>, merged: bool) -> Result<()> {
    let selection = target.map(parse_target).transpose()?;
    let build = BuildWorkspace::init(options, BuildToolVersion::current())
        .context("initializing build workspace")?;

    let result = render(&build, selection, format, merged, &mut io::stdout().lock());
    build.cleanup()?;
    result
}

fn render(
    build: &BuildWorkspace,
    selection: Option<(TargetOs, Arch)>,
    format: Option<&str>,
    merged: bool,
    out: &mut impl Write,
) -> Result<()> {
    let targets: Vec<&TargetEnvironment> = match selection {
        Some((os, arch)) => match build.environment().get(os, arch) {
            Some(env) => vec![env],
            None => bail!("target {os}/{arch} is not available on this host"),
        },
        None => build.environment().targets().collect(),
    };

    match format.unwrap_or("text") {
        "text" => {
            for env in targets {
                writeln!(out, "# {}/{}", env.os, env.arch)?;
                if merged {
                    for var in env.merged() {
                        out.write_all(var.as_encoded_bytes())?;
                        writeln!(out)?;
                    }
                } else {
                    for var in &env.vars {
                        writeln!(out, "{var}")?;
                    }
                }
                writeln!(out, "# nm: {}", env.nm.display())?;
                writeln!(out, "# pkg: {}", env.pkg_dir(build.install_root()).display())?;
            }
        }
        "json" => {
            let catalog = build.catalog();
            let report = EnvReport {
                version: catalog.version().version().to_string(),
                dry_run: build.options().dry_run,
                install_root: build.install_root(),
                toolchain: catalog.root(),
                work: build.workspace().path(),
                targets: targets
                    .into_iter()
                    .map(|env| TargetReport {
                        env,
                        pkg_dir: env.pkg_dir(build.install_root()),
                    })
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        other => bail!("unknown format: '{other}'. Choose: text, json"),
    }
    Ok(())
}
