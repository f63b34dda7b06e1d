//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It is
//! self-contained so `build.rs` can include it to render the manual page.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A configuration-driven incremental build tool for C and C++ projects.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project file to use.
    #[arg(short, long, value_name = "FILE", default_value = "larva.toml")]
    pub file: PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }
}

/// Arguments accepted by commands that build.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default)]
pub struct BuildArgs {
    /// Use each target's release flags instead of its debug flags.
    #[arg(long)]
    pub release: bool,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Compile changed sources, link, and run post-build steps (default).
    Build(BuildArgs),

    /// Optimised build using release flags.
    Release,

    /// Build, then run the executable from the output directory.
    Play(BuildArgs),

    /// Run only the post-build steps.
    Assets,

    /// Remove the directories listed by the `clean` command.
    Clean,

    /// List built-in and project-defined commands.
    List,

    /// Run a command declared under `[commands]` in the project file.
    #[command(external_subcommand)]
    Custom(Vec<String>),
}
