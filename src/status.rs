//! User-facing build status.
//!
//! Every external command is echoed before it runs, skipped sources are
//! announced, and copy counts are summarised per pattern. Reporters receive
//! structured [`BuildEvent`]s so tests can assert on them without scraping
//! terminal output.

use camino::Utf8Path;
use std::fmt;
use std::io::{self, Write};

/// Something worth telling the user about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent<'a> {
    /// An external command is about to run.
    Command {
        /// Program being launched.
        program: &'a str,
        /// Arguments in order.
        args: &'a [String],
    },
    /// A source was up to date and not recompiled.
    Skip {
        /// The skipped source.
        source: &'a Utf8Path,
    },
    /// A target's source patterns matched nothing.
    NoSources {
        /// Target name.
        target: &'a str,
    },
    /// Files matching a copy pattern were copied.
    Copied {
        /// Number of files copied.
        count: usize,
        /// The pattern as written.
        pattern: &'a str,
    },
    /// A directory was removed by `clean`.
    Removed {
        /// Removed directory.
        path: &'a Utf8Path,
    },
    /// `clean` finished.
    Cleaned,
}

impl fmt::Display for BuildEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { program, args } if args.is_empty() => write!(f, "  {program}"),
            Self::Command { program, args } => write!(f, "  {program} {}", args.join(" ")),
            Self::Skip { source } => {
                let name = source.file_name().unwrap_or(source.as_str());
                write!(f, "  skip {name} (unchanged)")
            }
            Self::NoSources { target } => {
                write!(f, "Warning: no sources found for target '{target}'")
            }
            Self::Copied { count, pattern } => {
                write!(f, "  copied {count} file(s) matching {pattern}")
            }
            Self::Removed { path } => write!(f, "  removed {path}"),
            Self::Cleaned => f.write_str("Cleaned."),
        }
    }
}

/// Report build progress to the user.
pub trait StatusReporter {
    /// Emit one event.
    fn report(&self, event: &BuildEvent<'_>);
}

/// Writes one line per event to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn report(&self, event: &BuildEvent<'_>) {
        // Status output failures should not abort the build.
        drop(writeln!(io::stderr(), "{event}"));
    }
}

/// Emits nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl StatusReporter for SilentReporter {
    fn report(&self, _event: &BuildEvent<'_>) {}
}
