//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the project file, resolves the build context for the host, and
//! dispatches to the selected command. [`execute`] is the seam used by tests:
//! it takes the configuration, context, runner and reporter explicitly.

mod commands;
mod error;
mod process;

pub use commands::usage;
pub use error::RunnerError;
pub use process::{CommandRunner, ProcessRunner, ToolCommand};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::config::Config;
use crate::context::{BuildContext, BuildMode};
use crate::manifest;
use crate::status::{ConsoleReporter, StatusReporter};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::Path;
use tracing::{Level, debug, warn};

/// Execute the parsed [`Cli`] against the project in the working directory.
///
/// # Errors
///
/// Returns an error if the project file is missing or invalid, or if the
/// selected command fails.
pub fn run(cli: &Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }
    let config = load_config(&cli.file)?;
    if tracing::enabled!(Level::DEBUG) {
        let dump = serde_json::to_string(&config).context("serialise project for logging")?;
        debug!(project = %dump, "loaded project");
    }
    let resolve = |mode: BuildMode| -> Result<BuildContext> {
        let ctx = BuildContext::detect(&config, mode)?;
        debug!(
            platform = %ctx.platform(),
            mode = %ctx.mode(),
            output = %ctx.output_dir(),
            cache = %ctx.cache_dir(),
            "resolved build context"
        );
        Ok(ctx)
    };

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    let reporter = ConsoleReporter;
    let mut runner = ProcessRunner::new(&reporter);
    let mut stdout = io::stdout().lock();
    execute(&command, &config, &resolve, &mut runner, &reporter, &mut stdout)
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(RunnerError::ManifestNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(manifest::from_path(path)?)
}

/// Dispatch one command.
///
/// The build context is resolved through `resolve` only by commands that
/// need one, so `list` and `clean` still work when the targets are
/// misconfigured. Command listings are written to `out`.
///
/// # Errors
///
/// Returns the first failure from the build engine or an external tool, or
/// [`RunnerError::UnknownCommand`] when a custom command is not declared.
pub fn execute(
    command: &Commands,
    config: &Config,
    resolve: &dyn Fn(BuildMode) -> Result<BuildContext>,
    runner: &mut dyn CommandRunner,
    reporter: &dyn StatusReporter,
    out: &mut dyn Write,
) -> Result<()> {
    let mode_ctx = |release: bool| {
        resolve(if release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        })
    };
    match command {
        Commands::Build(args) => {
            commands::build(config, &mode_ctx(args.release)?, runner, reporter)?;
        }
        Commands::Release => {
            commands::build(config, &mode_ctx(true)?, runner, reporter)?;
        }
        Commands::Play(args) => {
            commands::play(config, &mode_ctx(args.release)?, runner, reporter)?;
        }
        Commands::Assets => {
            commands::assets(config, &mode_ctx(false)?, runner, reporter)?;
        }
        Commands::Clean => commands::clean(config, reporter)?,
        Commands::List => {
            out.write_all(usage(config).as_bytes())
                .context("write command list")?;
        }
        Commands::Custom(words) => {
            let (name, extra) = words.split_first().map_or(("", &[][..]), |(name, rest)| {
                (name.as_str(), rest)
            });
            let Some(custom) = config.commands.get(name) else {
                out.write_all(usage(config).as_bytes())
                    .context("write command list")?;
                return Err(RunnerError::UnknownCommand {
                    name: name.to_owned(),
                }
                .into());
            };
            if !extra.is_empty() {
                warn!(command = name, ignored = ?extra, "custom commands take no arguments");
            }
            commands::run_custom(config, &mode_ctx(false)?, custom, runner, reporter)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
