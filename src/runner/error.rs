//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors raised while dispatching commands or running external tools.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The project file does not exist at the expected path.
    #[error("project file {} not found", path.display())]
    #[diagnostic(
        code(larva::runner::manifest_not_found),
        help("run larva from the directory containing larva.toml, or pass --file")
    )]
    ManifestNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// The requested command is neither built in nor declared.
    #[error("unknown command '{name}'")]
    #[diagnostic(
        code(larva::runner::unknown_command),
        help("run `larva list` to see the available commands")
    )]
    UnknownCommand {
        /// The word given on the command line.
        name: String,
    },

    /// An external tool could not be launched.
    #[error("failed to launch {program}")]
    #[diagnostic(code(larva::runner::spawn))]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying launch error.
        #[source]
        source: io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{program} failed: {status}")]
    #[diagnostic(code(larva::runner::tool_failed))]
    Failed {
        /// Program that failed.
        program: String,
        /// Rendered exit status.
        status: String,
    },

    /// A post-build hook or exec step expanded to nothing.
    #[error("command template '{template}' is empty after expansion")]
    #[diagnostic(code(larva::runner::empty_command))]
    EmptyCommand {
        /// The template before expansion.
        template: String,
    },
}
