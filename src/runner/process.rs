//! External process execution.
//!
//! Compilers, the linker, post-build hooks and `exec:` steps all go through
//! [`CommandRunner`]. The production [`ProcessRunner`] echoes the command,
//! lets the child inherit the terminal, and turns a launch failure or
//! non-zero exit into an error that aborts the build. There is no retry and
//! no timeout.

use super::RunnerError;
use crate::status::{BuildEvent, StatusReporter};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::info;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<Utf8PathBuf>,
}

impl ToolCommand {
    /// Start a command for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command from `dir` instead of the current directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Split a whitespace-separated command line.
    ///
    /// There is no quoting: arguments containing spaces cannot be expressed.
    /// Returns `None` for a blank line.
    #[must_use]
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).args(words))
    }

    /// Program to launch.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory override, if any.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.current_dir.as_deref()
    }
}

/// Executes external commands on behalf of the build.
pub trait CommandRunner {
    /// Run `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Spawn`] when the program cannot be launched and
    /// [`RunnerError::Failed`] when it exits unsuccessfully.
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunnerError>;
}

/// Runs commands as child processes sharing the parent's standard streams.
pub struct ProcessRunner<'a> {
    reporter: &'a dyn StatusReporter,
}

impl<'a> ProcessRunner<'a> {
    /// Create a runner that echoes commands through `reporter`.
    #[must_use]
    pub const fn new(reporter: &'a dyn StatusReporter) -> Self {
        Self { reporter }
    }
}

impl CommandRunner for ProcessRunner<'_> {
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunnerError> {
        self.reporter.report(&BuildEvent::Command {
            program: command.program(),
            args: command.arguments(),
        });
        info!(
            program = command.program(),
            cwd = command.working_dir().map(Utf8Path::as_str),
            "Running command: {} {}",
            command.program(),
            command.arguments().join(" ")
        );

        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }
        let status = cmd.status().map_err(|source| RunnerError::Spawn {
            program: command.program().to_owned(),
            source,
        })?;
        check_exit_status(command.program(), status)
    }
}

fn check_exit_status(program: &str, status: ExitStatus) -> Result<(), RunnerError> {
    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::Failed {
            program: program.to_owned(),
            status: status.to_string(),
        })
    }
}
