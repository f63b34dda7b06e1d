//! Built-in and custom command implementations.

use super::{CommandRunner, RunnerError, ToolCommand};
use crate::build::{BuildError, BuildSession, BuildStats};
use crate::config::{CommandStep, Config, CustomCommand};
use crate::context::BuildContext;
use crate::status::{BuildEvent, StatusReporter};
use crate::vars::VariableExpander;
use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, io};
use tracing::{debug, warn};

const BUILTIN_COMMANDS: [(&str, &str); 6] = [
    ("build", "Debug build (default)"),
    ("release", "Optimized release build"),
    ("play", "Build, then run the executable"),
    ("assets", "Run post-build steps only"),
    ("clean", "Remove build output"),
    ("list", "Show available commands"),
];

/// Render the command list shown by `larva list` and for unknown commands.
///
/// Project-defined commands follow the built-ins in declaration order. A
/// `clean` entry only contributes its directories, so it is not repeated.
#[must_use]
pub fn usage(config: &Config) -> String {
    let mut text = String::from("larva - build system\n\nUsage: larva [command]\n\n");
    let custom = config
        .commands
        .iter()
        .filter(|(name, _)| !is_builtin(name))
        .map(|(name, command)| (name.as_str(), command.description.as_str()));
    for (name, description) in BUILTIN_COMMANDS.into_iter().chain(custom) {
        text.push_str(&format!("  {name:<10} {description}\n"));
    }
    text
}

fn is_builtin(name: &str) -> bool {
    BUILTIN_COMMANDS.iter().any(|(builtin, _)| *builtin == name)
}

pub(super) fn build(
    config: &Config,
    ctx: &BuildContext,
    runner: &mut dyn CommandRunner,
    reporter: &dyn StatusReporter,
) -> Result<BuildStats, BuildError> {
    let stats = BuildSession::new(config, ctx, runner, reporter).build_all()?;
    debug!(?stats, mode = %ctx.mode(), "build finished");
    Ok(stats)
}

pub(super) fn assets(
    config: &Config,
    ctx: &BuildContext,
    runner: &mut dyn CommandRunner,
    reporter: &dyn StatusReporter,
) -> Result<BuildStats, BuildError> {
    let mut session = BuildSession::new(config, ctx, runner, reporter);
    session.ensure_dirs()?;
    session.run_post_build()?;
    Ok(session.stats())
}

pub(super) fn play(
    config: &Config,
    ctx: &BuildContext,
    runner: &mut dyn CommandRunner,
    reporter: &dyn StatusReporter,
) -> Result<(), BuildError> {
    build(config, ctx, runner, reporter)?;
    let exe = ctx.executable_path();
    exec(ctx, &exe, runner)
}

/// Run a custom command's steps in order, stopping at the first failure.
pub(super) fn run_custom(
    config: &Config,
    ctx: &BuildContext,
    command: &CustomCommand,
    runner: &mut dyn CommandRunner,
    reporter: &dyn StatusReporter,
) -> Result<(), BuildError> {
    let expander = VariableExpander::new(ctx, &config.project.vars);
    for step in &command.steps {
        debug!(%step, "running step");
        match step {
            CommandStep::Build => {
                build(config, ctx, runner, reporter)?;
            }
            CommandStep::PostBuild => {
                assets(config, ctx, runner, reporter)?;
            }
            CommandStep::Exec { path } => {
                let program = expander.expand(path);
                if program.trim().is_empty() {
                    return Err(RunnerError::EmptyCommand {
                        template: path.clone(),
                    }
                    .into());
                }
                exec(ctx, Utf8Path::new(&program), runner)?;
            }
        }
    }
    Ok(())
}

/// Run `program` from the output directory with no arguments.
fn exec(
    ctx: &BuildContext,
    program: &Utf8Path,
    runner: &mut dyn CommandRunner,
) -> Result<(), BuildError> {
    let program = resolve_program(ctx.project_root(), program);
    let command = ToolCommand::new(program.as_str()).current_dir(ctx.output_dir().to_owned());
    runner.run(&command)?;
    Ok(())
}

/// Anchor a relative program path at the project root.
///
/// The child starts in the output directory, so `build/game` would otherwise
/// resolve to `build/build/game`. Bare names are left for `PATH` lookup.
fn resolve_program(root: &Utf8Path, program: &Utf8Path) -> Utf8PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        root.join(program)
    } else {
        program.to_owned()
    }
}

/// Remove every directory listed by the `clean` command.
///
/// Every directory is attempted; failures are reported together afterwards.
/// Directories that do not exist are skipped silently.
pub(super) fn clean(config: &Config, reporter: &dyn StatusReporter) -> Result<(), BuildError> {
    let mut failed = Vec::new();
    for dir in config.clean_dirs() {
        match fs::remove_dir_all(dir) {
            Ok(()) => reporter.report(&BuildEvent::Removed { path: dir }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(%dir, "nothing to remove");
            }
            Err(err) => {
                warn!(%dir, error = %err, "failed to remove directory");
                failed.push(dir.clone());
            }
        }
    }
    if !failed.is_empty() {
        return Err(BuildError::CleanFailed { paths: failed });
    }
    reporter.report(&BuildEvent::Cleaned);
    Ok(())
}
