//! Project file loading.
//!
//! `larva.toml` is read once at start-up and deserialised straight into
//! [`Config`]. Parse failures keep the file contents and the offending span
//! so `miette` can point at the exact line.
//
// Module-level suppression for version-dependent lint false positives from
// miette/thiserror derive macros. FIXME: remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::config::Config;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::{fs, io, path::Path};
use thiserror::Error;

/// Default project file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "larva.toml";

/// Errors raised while loading the project file.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    #[diagnostic(code(larva::manifest::read))]
    Read {
        /// Display form of the manifest path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse {path}: {message}")]
    #[diagnostic(
        code(larva::manifest::parse),
        help("check the [project], [targets.*], [[post_build]] and [commands.*] tables")
    )]
    Parse {
        /// Display form of the manifest path.
        path: String,
        /// Parser message without location prefix.
        message: String,
        /// Manifest contents for span rendering.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the problem, when known.
        #[label("here")]
        span: Option<SourceSpan>,
    },
}

/// Parse a project file held in memory. `name` labels diagnostics.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] when the text is not a valid project
/// description.
pub fn from_str_named(toml_text: &str, name: &str) -> Result<Config, ManifestError> {
    toml::from_str(toml_text).map_err(|err| ManifestError::Parse {
        path: name.to_owned(),
        message: err.message().to_owned(),
        src: NamedSource::new(name, toml_text.to_owned()),
        span: err.span().map(SourceSpan::from),
    })
}

/// Parse a project file held in memory.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] when the text is not a valid project
/// description.
///
/// # Examples
///
/// ```
/// let config = larva::manifest::from_str("[project]\nname = \"game\"\n").expect("parse");
/// assert_eq!(config.project.name, "game");
/// assert!(larva::manifest::from_str("[project]\n").is_err());
/// ```
pub fn from_str(toml_text: &str) -> Result<Config, ManifestError> {
    from_str_named(toml_text, DEFAULT_MANIFEST)
}

/// Load and parse the project file at `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] when the file cannot be read and
/// [`ManifestError::Parse`] when it is malformed.
pub fn from_path(path: impl AsRef<Path>) -> Result<Config, ManifestError> {
    let path_ref = path.as_ref();
    let name = path_ref.display().to_string();
    let data = fs::read_to_string(path_ref).map_err(|source| ManifestError::Read {
        path: name.clone(),
        source,
    })?;
    from_str_named(&data, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandStep;
    use rstest::rstest;

    #[test]
    fn full_project_loads() {
        let config = from_str(
            r#"
            [project]
            name = "game"
            cache = "obj"
            compiler = "clang"
            [project.vars]
            assets = "data"

            [targets.game]
            kind = "executable"
            language = "c++20"
            sources = ["src/*.cpp"]

            [[post_build]]
            target = "game"
            copy = ["assets/*.png"]
            run_linux = "cp -r data {output}/data"

            [commands.pack]
            description = "Build and pack"
            steps = ["build", "exec:{output}/{exe}"]
            "#,
        )
        .expect("parse");
        assert_eq!(config.project.vars["assets"], "data");
        assert_eq!(config.post_build.len(), 1);
        assert_eq!(
            config.commands["pack"].steps,
            [
                CommandStep::Build,
                CommandStep::Exec {
                    path: "{output}/{exe}".into()
                }
            ]
        );
    }

    #[rstest]
    #[case::missing_name("[project]\n")]
    #[case::unknown_key("[project]\nname = \"g\"\nflavour = \"x\"\n")]
    #[case::bad_kind("[project]\nname = \"g\"\n[targets.a]\nkind = \"library\"\nlanguage = \"c99\"\n")]
    #[case::bad_step("[project]\nname = \"g\"\n[commands.x]\nsteps = [\"deploy\"]\n")]
    #[case::bad_compiler("[project]\nname = \"g\"\ncompiler = \"msvc\"\n")]
    fn invalid_projects_are_rejected(#[case] text: &str) {
        let err = from_str(text).expect_err("should fail");
        assert!(matches!(err, ManifestError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = from_str_named("[project\n", "demo/larva.toml").expect_err("should fail");
        assert!(err.to_string().starts_with("failed to parse demo/larva.toml"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = from_path(dir.path().join(DEFAULT_MANIFEST)).expect_err("missing");
        assert!(matches!(err, ManifestError::Read { .. }), "got {err:?}");
    }
}
