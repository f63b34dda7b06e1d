//! Modification-time helpers.
//!
//! Staleness is decided by mtime comparison, so tests move timestamps
//! explicitly instead of sleeping.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Set the modification time of `path`.
///
/// # Panics
///
/// Panics if the file cannot be opened or updated.
pub fn set_mtime(path: impl AsRef<Path>, time: SystemTime) {
    File::options()
        .write(true)
        .open(path.as_ref())
        .and_then(|file| file.set_modified(time))
        .expect("set mtime");
}

/// Move the modification time of `path` `secs` seconds into the future.
pub fn touch_forward(path: impl AsRef<Path>, secs: u64) {
    set_mtime(path, SystemTime::now() + Duration::from_secs(secs));
}

/// Move the modification time of `path` `secs` seconds into the past.
pub fn age(path: impl AsRef<Path>, secs: u64) {
    set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
}
