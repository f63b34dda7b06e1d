//! Asset copies and platform hooks run after linking.

use super::patterns::expand_pattern;
use super::{BuildError, BuildSession};
use crate::runner::{RunnerError, ToolCommand};
use crate::staleness::is_stale;
use crate::status::BuildEvent;
use std::fs;
use tracing::debug;

impl BuildSession<'_> {
    /// Run every post-build step in declaration order.
    ///
    /// Each copy pattern copies its stale matches into the output directory,
    /// flattened to their base names. The step's hook for the current
    /// platform, if any, is expanded, split on whitespace and run.
    ///
    /// # Errors
    ///
    /// Returns an error when a pattern is invalid, a copy fails, or the hook
    /// fails.
    pub fn run_post_build(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        for step in &config.post_build {
            for pattern in &step.copy {
                let count = self.copy_matches(pattern)?;
                if count > 0 {
                    self.reporter.report(&BuildEvent::Copied { count, pattern });
                }
            }
            if let Some(template) = step.command_for(self.ctx.platform()) {
                let line = self.expander.expand(template);
                let command = ToolCommand::from_command_line(&line).ok_or_else(|| {
                    RunnerError::EmptyCommand {
                        template: template.to_owned(),
                    }
                })?;
                self.runner.run(&command)?;
            }
        }
        Ok(())
    }

    fn copy_matches(&mut self, pattern: &str) -> Result<usize, BuildError> {
        let output = self.ctx.output_dir();
        let mut count = 0;
        for file in expand_pattern(pattern)? {
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = output.join(name);
            if !is_stale(&file, &dest) {
                debug!(%file, "asset unchanged");
                continue;
            }
            fs::copy(&file, &dest).map_err(|source| BuildError::Copy {
                from: file.clone(),
                to: dest.clone(),
                source,
            })?;
            count += 1;
        }
        self.stats.copied += count;
        Ok(count)
    }
}
