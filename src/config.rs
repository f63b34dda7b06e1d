//! Project configuration model.
//!
//! These structures mirror the `larva.toml` schema and are deserialised with
//! `toml`. The tree is loaded once at start-up and never mutated afterwards;
//! every build component borrows it.
//!
//! ```rust
//! use larva::config::{Config, TargetKind};
//!
//! let toml = r#"
//! [project]
//! name = "game"
//!
//! [targets.game]
//! kind = "executable"
//! language = "c99"
//! sources = ["src/*.c"]
//! "#;
//! let config: Config = toml::from_str(toml).expect("parse");
//! assert_eq!(config.targets["game"].kind, TargetKind::Executable);
//! ```

use crate::context::BuildMode;
use crate::platform::Platform;
use crate::toolchain::CompilerFamily;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Name of the custom command whose `remove` list drives `larva clean`.
pub const CLEAN_COMMAND: &str = "clean";

/// Top-level project file structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project-wide settings.
    pub project: Project,

    /// Targets keyed by name, in declaration order.
    #[serde(default)]
    pub targets: IndexMap<String, Target>,

    /// Steps run after every successful build.
    #[serde(default)]
    pub post_build: Vec<PostBuildStep>,

    /// User-defined commands keyed by name.
    #[serde(default)]
    pub commands: IndexMap<String, CustomCommand>,
}

/// Project-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Project name; also the base name of the linked executable.
    pub name: String,

    /// Directory for objects and dependency files. Defaults to the output
    /// directory.
    #[serde(default)]
    pub cache: Option<Utf8PathBuf>,

    /// Compiler family used for every target.
    #[serde(default)]
    pub compiler: CompilerFamily,

    /// User-defined `{name}` placeholders.
    #[serde(default)]
    pub vars: IndexMap<String, String>,
}

/// What a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// The linked program. At most one per project.
    Executable,
    /// A collection of object files linked into the executable.
    Object,
}

/// A named unit of compilation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Executable or object collection.
    pub kind: TargetKind,

    /// Language tag such as `c99` or `c++20`.
    pub language: String,

    /// Source glob patterns.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Include directories.
    #[serde(default)]
    pub includes: Vec<Utf8PathBuf>,

    /// Targets built before this one and linked alongside it.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Per-platform additions keyed by platform identifier (`windows`,
    /// `linux`).
    #[serde(default)]
    pub platform: IndexMap<String, PlatformOverlay>,

    /// Flags used for debug builds.
    #[serde(default)]
    pub debug: ModeFlags,

    /// Flags used for release builds.
    #[serde(default)]
    pub release: ModeFlags,
}

impl Target {
    /// Overlay for `platform`, when declared.
    #[must_use]
    pub fn overlay(&self, platform: Platform) -> Option<&PlatformOverlay> {
        self.platform.get(platform.key())
    }

    /// Raw (unexpanded) flags for `mode`.
    #[must_use]
    pub fn mode_flags(&self, mode: BuildMode) -> &[String] {
        match mode {
            BuildMode::Debug => &self.debug.flags,
            BuildMode::Release => &self.release.flags,
        }
    }
}

/// Platform-specific additions to a target.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformOverlay {
    /// Extra include directories appended after the target's own.
    #[serde(default)]
    pub includes: Vec<Utf8PathBuf>,

    /// Library search directories passed to the linker.
    #[serde(default)]
    pub libdirs: Vec<Utf8PathBuf>,

    /// Library names passed to the linker.
    #[serde(default)]
    pub links: Vec<String>,

    /// Output directory. Only read from the executable target.
    #[serde(default)]
    pub output: Option<Utf8PathBuf>,
}

/// Flag list for one build mode.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModeFlags {
    /// Compiler flags, subject to variable expansion.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Asset copies and hook commands run after linking.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostBuildStep {
    /// Associated target. Informational only.
    #[serde(default)]
    pub target: Option<String>,

    /// Glob patterns whose matches are copied into the output directory.
    #[serde(default)]
    pub copy: Vec<String>,

    /// Hook run on non-Windows hosts.
    #[serde(default)]
    pub run_linux: Option<String>,

    /// Hook run on Windows hosts.
    #[serde(default)]
    pub run_windows: Option<String>,
}

impl PostBuildStep {
    /// Hook template for `platform`, ignoring blank entries.
    #[must_use]
    pub fn command_for(&self, platform: Platform) -> Option<&str> {
        let command = match platform {
            Platform::Windows => self.run_windows.as_deref(),
            Platform::Linux => self.run_linux.as_deref(),
        };
        command.filter(|cmd| !cmd.trim().is_empty())
    }
}

/// A user-defined command.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CustomCommand {
    /// One-line summary shown by `larva list`.
    #[serde(default)]
    pub description: String,

    /// Steps run in order.
    #[serde(default)]
    pub steps: Vec<CommandStep>,

    /// Directories removed by `larva clean`.
    #[serde(default)]
    pub remove: Vec<Utf8PathBuf>,
}

/// One step of a custom command.
///
/// Steps are written as plain strings: `build`, `post_build`, or
/// `exec:<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStep {
    /// Run a full build.
    Build,
    /// Run the post-build pipeline only.
    PostBuild,
    /// Run a program. The path is a variable template.
    Exec {
        /// Unexpanded program path.
        path: String,
    },
}

const EXEC_PREFIX: &str = "exec:";

impl FromStr for CommandStep {
    type Err = String;

    fn from_str(step: &str) -> Result<Self, Self::Err> {
        match step {
            "build" => Ok(Self::Build),
            "post_build" => Ok(Self::PostBuild),
            other => match other.strip_prefix(EXEC_PREFIX) {
                Some(path) if !path.trim().is_empty() => Ok(Self::Exec {
                    path: path.trim().to_owned(),
                }),
                Some(_) => Err(format!("step `{other}` names no program")),
                None => Err(format!(
                    "unknown step `{other}`; expected build, post_build, or exec:<path>"
                )),
            },
        }
    }
}

impl fmt::Display for CommandStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::PostBuild => f.write_str("post_build"),
            Self::Exec { path } => write!(f, "{EXEC_PREFIX}{path}"),
        }
    }
}

impl<'de> Deserialize<'de> for CommandStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for CommandStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Structural problems found when resolving targets.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// More than one target declares `kind = "executable"`.
    #[error("multiple executable targets declared: {}", names.join(", "))]
    #[diagnostic(
        code(larva::config::multiple_executables),
        help("mark all but one of these targets as kind = \"object\"")
    )]
    MultipleExecutables {
        /// Names of the offending targets.
        names: Vec<String>,
    },

    /// A dependency names a target that is not declared.
    #[error("target '{dependent}' depends on unknown target '{name}'")]
    #[diagnostic(code(larva::config::unknown_target))]
    UnknownTarget {
        /// The missing target name.
        name: String,
        /// The target that listed it.
        dependent: String,
    },
}

impl Config {
    /// Locate the executable target.
    ///
    /// Returns `Ok(None)` when the project declares no executable; callers
    /// treat that as a build with nothing to compile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MultipleExecutables`] when more than one target
    /// is an executable.
    pub fn executable(&self) -> Result<Option<(&str, &Target)>, ConfigError> {
        let mut executables = self
            .targets
            .iter()
            .filter(|(_, target)| target.kind == TargetKind::Executable);
        let Some((name, target)) = executables.next() else {
            return Ok(None);
        };
        let extra: Vec<String> = executables.map(|(other, _)| other.clone()).collect();
        if extra.is_empty() {
            Ok(Some((name.as_str(), target)))
        } else {
            let mut names = vec![name.clone()];
            names.extend(extra);
            Err(ConfigError::MultipleExecutables { names })
        }
    }

    /// Resolve the direct dependencies of `dependent`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTarget`] for the first dependency that
    /// is not declared.
    pub fn dependencies<'a>(
        &'a self,
        dependent: &str,
        target: &'a Target,
    ) -> Result<Vec<(&'a str, &'a Target)>, ConfigError> {
        target
            .deps
            .iter()
            .map(|name| {
                self.targets
                    .get(name)
                    .map(|dep| (name.as_str(), dep))
                    .ok_or_else(|| ConfigError::UnknownTarget {
                        name: name.clone(),
                        dependent: dependent.to_owned(),
                    })
            })
            .collect()
    }

    /// The `clean` command's removal list, or an empty slice.
    #[must_use]
    pub fn clean_dirs(&self) -> &[Utf8PathBuf] {
        self.commands
            .get(CLEAN_COMMAND)
            .map_or(&[], |command| command.remove.as_slice())
    }
}
