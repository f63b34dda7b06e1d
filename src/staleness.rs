//! Modification-time staleness checks.
//!
//! A compilation unit is out of date when its object is missing, its source
//! is missing or newer, or any header recorded in the compiler-emitted
//! dependency file is newer than the object. Header discovery is delegated to
//! the compiler (`-MMD -MF`); this module only consumes the resulting
//! Make-style listing.
//!
//! Asset copies use the simpler [`is_stale`] check: destination missing or
//! older than the source.

use camino::{Utf8Path, Utf8PathBuf};
use std::{fmt, fs, time::SystemTime};
use tracing::debug;

/// Why a compilation unit must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    /// The object file is missing or unreadable.
    MissingObject,
    /// The source file is missing; compiling surfaces the toolchain error.
    MissingSource,
    /// The source is newer than the object.
    SourceNewer,
    /// A recorded dependency is newer than the object.
    DependencyNewer(Utf8PathBuf),
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingObject => f.write_str("object file missing"),
            Self::MissingSource => f.write_str("source file missing"),
            Self::SourceNewer => f.write_str("source newer than object"),
            Self::DependencyNewer(dep) => write!(f, "dependency {dep} newer than object"),
        }
    }
}

fn modified(path: &Utf8Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Decide whether `object` must be rebuilt from `source`.
///
/// Returns the first reason found, or `None` when the object is current.
/// A missing or unreadable dependency file contributes no dependencies.
#[must_use]
pub fn rebuild_reason(
    source: &Utf8Path,
    object: &Utf8Path,
    depfile: &Utf8Path,
) -> Option<RebuildReason> {
    let Some(object_time) = modified(object) else {
        return Some(RebuildReason::MissingObject);
    };
    let Some(source_time) = modified(source) else {
        return Some(RebuildReason::MissingSource);
    };
    if source_time > object_time {
        return Some(RebuildReason::SourceNewer);
    }
    let listing = match fs::read_to_string(depfile) {
        Ok(listing) => listing,
        Err(err) => {
            debug!(depfile = %depfile, error = %err, "no dependency listing");
            return None;
        }
    };
    parse_depfile(&listing)
        .into_iter()
        .find(|dep| modified(dep).is_some_and(|time| time > object_time))
        .map(RebuildReason::DependencyNewer)
}

/// Boolean form of [`rebuild_reason`].
#[must_use]
pub fn needs_rebuild(source: &Utf8Path, object: &Utf8Path, depfile: &Utf8Path) -> bool {
    rebuild_reason(source, object, depfile).is_some()
}

/// Two-argument check used for asset copies.
///
/// True when either file is unreadable or `source` is strictly newer than
/// `dest`.
#[must_use]
pub fn is_stale(source: &Utf8Path, dest: &Utf8Path) -> bool {
    match (modified(source), modified(dest)) {
        (Some(source_time), Some(dest_time)) => source_time > dest_time,
        _ => true,
    }
}

/// Extract dependency paths from a Make-style dependency listing.
///
/// Backslash-newline continuations are collapsed to whitespace and
/// everything up to the first colon is discarded.
///
/// ```
/// use larva::staleness::parse_depfile;
///
/// let deps = parse_depfile("obj/a.o: src/a.c \\\n  include/a.h include/b.h\n");
/// assert_eq!(deps, ["src/a.c", "include/a.h", "include/b.h"]);
/// ```
#[must_use]
pub fn parse_depfile(listing: &str) -> Vec<Utf8PathBuf> {
    let flat = listing.replace("\\\r\n", " ").replace("\\\n", " ");
    flat.split_once(':')
        .map(|(_, deps)| deps.split_whitespace().map(Utf8PathBuf::from).collect())
        .unwrap_or_default()
}
