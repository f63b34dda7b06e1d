//! Errors raised by the build engine.
//
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::config::ConfigError;
use crate::runner::RunnerError;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures that abort a build, post-build run or clean.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The target graph is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// An external tool failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runner(#[from] RunnerError),

    /// A source or copy pattern is not a valid glob.
    #[error("invalid glob pattern '{pattern}'")]
    #[diagnostic(code(larva::build::invalid_pattern))]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// Parser error.
        #[source]
        source: glob::PatternError,
    },

    /// A directory could not be read while expanding a pattern.
    #[error("failed to expand '{pattern}'")]
    #[diagnostic(code(larva::build::glob_io))]
    GlobEntry {
        /// The pattern being expanded.
        pattern: String,
        /// Underlying I/O failure.
        #[source]
        source: glob::GlobError,
    },

    /// A pattern matched a path that is not valid UTF-8.
    #[error("path {} is not valid UTF-8", path.display())]
    #[diagnostic(code(larva::build::non_utf8_path))]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// The output or cache directory could not be created.
    #[error("failed to create directory {path}")]
    #[diagnostic(code(larva::build::create_dir))]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// An asset could not be copied into the output directory.
    #[error("failed to copy {from} to {to}")]
    #[diagnostic(code(larva::build::copy))]
    Copy {
        /// Source file.
        from: Utf8PathBuf,
        /// Destination file.
        to: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// One or more directories could not be removed by `clean`.
    #[error("failed to remove {}", join_paths(paths))]
    #[diagnostic(
        code(larva::build::clean_failed),
        help("the remaining directories were still processed; rerun with -v for details")
    )]
    CleanFailed {
        /// Directories that could not be removed.
        paths: Vec<Utf8PathBuf>,
    },
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(Utf8PathBuf::as_path)
        .map(Utf8Path::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_failure_lists_every_path() {
        let err = BuildError::CleanFailed {
            paths: vec![Utf8PathBuf::from("build"), Utf8PathBuf::from("obj")],
        };
        assert_eq!(err.to_string(), "failed to remove build, obj");
    }
}
