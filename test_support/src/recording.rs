//! In-process doubles for the command runner and status reporter.

use larva::runner::{CommandRunner, RunnerError, ToolCommand};
use larva::status::{BuildEvent, StatusReporter};
use std::fs;
use std::sync::Mutex;

/// Records every command instead of running it.
///
/// Successful commands create the file named by `-o`, so staleness checks
/// see fresh objects on the next build.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Vec<ToolCommand>,
    fail_at: Option<usize>,
}

impl RecordingRunner {
    /// A runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner whose `index`th command (zero-based) fails.
    #[must_use]
    pub fn failing_at(index: usize) -> Self {
        Self {
            commands: Vec::new(),
            fail_at: Some(index),
        }
    }

    /// Commands seen so far, including a failing one.
    #[must_use]
    pub fn commands(&self) -> &[ToolCommand] {
        &self.commands
    }

    /// Each recorded command rendered as `program arg arg...`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|cmd| {
                let mut line = cmd.program().to_owned();
                for arg in cmd.arguments() {
                    line.push(' ');
                    line.push_str(arg);
                }
                line
            })
            .collect()
    }

    /// Commands whose arguments include `-c`.
    #[must_use]
    pub fn compiles(&self) -> Vec<&ToolCommand> {
        self.commands
            .iter()
            .filter(|cmd| cmd.arguments().iter().any(|arg| arg == "-c"))
            .collect()
    }

    /// Forget recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), RunnerError> {
        let index = self.commands.len();
        self.commands.push(command.clone());
        if self.fail_at == Some(index) {
            return Err(RunnerError::Failed {
                program: command.program().to_owned(),
                status: "exit status: 1".to_owned(),
            });
        }
        let args = command.arguments();
        if let Some(pos) = args.iter().position(|arg| arg == "-o")
            && let Some(output) = args.get(pos + 1)
        {
            fs::write(output, "").map_err(|source| RunnerError::Spawn {
                program: command.program().to_owned(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Collects rendered status lines.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Lines reported so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, event: &BuildEvent<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(event.to_string());
        }
    }
}
