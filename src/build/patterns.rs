//! Source and asset pattern expansion.
//!
//! Patterns are relative to the working directory, matched case-sensitively,
//! and `*` never crosses a path separator. Only regular files are returned,
//! in the lexical order `glob` yields them. A pattern with no matches
//! contributes nothing.

use super::BuildError;
use camino::Utf8PathBuf;
use glob::{MatchOptions, glob_with};

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand one pattern to the files it matches.
pub(crate) fn expand_pattern(pattern: &str) -> Result<Vec<Utf8PathBuf>, BuildError> {
    let entries = glob_with(pattern, OPTIONS).map_err(|source| BuildError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| BuildError::GlobEntry {
            pattern: pattern.to_owned(),
            source,
        })?;
        if !path.is_file() {
            continue;
        }
        let utf8 = Utf8PathBuf::from_path_buf(path)
            .map_err(|path| BuildError::NonUtf8Path { path })?;
        files.push(utf8);
    }
    Ok(files)
}

/// Expand every pattern in order, concatenating the matches.
pub(crate) fn expand_patterns(patterns: &[String]) -> Result<Vec<Utf8PathBuf>, BuildError> {
    let mut files = Vec::new();
    for pattern in patterns {
        files.extend(expand_pattern(pattern)?);
    }
    Ok(files)
}
