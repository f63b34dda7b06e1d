//! Immutable per-invocation build context.
//!
//! Everything that used to be decided once and read from everywhere (host
//! platform, build mode, output and cache directories, compiler drivers) is
//! resolved up front into a [`BuildContext`] and passed explicitly to every
//! build component. Two contexts can coexist in one process, which is what
//! the integration tests rely on.

use crate::config::{Config, ConfigError};
use crate::platform::Platform;
use crate::toolchain::{DEPFILE_EXTENSION, Language, OBJECT_EXTENSION, Toolchain};
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::{env, fmt};

/// Output directory used when the executable target declares none for the
/// current platform.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Debug or release flag selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Uses each target's `debug.flags`.
    #[default]
    Debug,
    /// Uses each target's `release.flags`.
    Release,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Release => "release",
        })
    }
}

/// Resolved settings for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    project_name: String,
    platform: Platform,
    mode: BuildMode,
    project_root: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    cache_dir: Utf8PathBuf,
    toolchain: Toolchain,
}

impl BuildContext {
    /// Resolve a context from `config` for an explicit platform, root and
    /// toolchain.
    ///
    /// The output directory comes from the executable target's overlay for
    /// `platform`; the cache directory defaults to the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MultipleExecutables`] when the executable
    /// target is ambiguous.
    pub fn resolve(
        config: &Config,
        platform: Platform,
        mode: BuildMode,
        project_root: Utf8PathBuf,
        toolchain: Toolchain,
    ) -> Result<Self, ConfigError> {
        let output_dir = config
            .executable()?
            .and_then(|(_, target)| target.overlay(platform))
            .and_then(|overlay| overlay.output.clone())
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
        let cache_dir = config
            .project
            .cache
            .clone()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| output_dir.clone());
        Ok(Self {
            project_name: config.project.name.clone(),
            platform,
            mode,
            project_root,
            output_dir,
            cache_dir,
            toolchain,
        })
    }

    /// Resolve a context for the host: detected platform, the current
    /// working directory as project root, and environment-aware drivers.
    ///
    /// # Errors
    ///
    /// Returns an error when the working directory cannot be read or is not
    /// UTF-8, or when the configuration is ambiguous.
    pub fn detect(config: &Config, mode: BuildMode) -> Result<Self> {
        let cwd = env::current_dir().context("read current directory")?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| anyhow!("working directory {} is not UTF-8", path.display()))?;
        let toolchain = Toolchain::from_env(config.project.compiler);
        Ok(Self::resolve(
            config,
            Platform::current(),
            mode,
            root,
            toolchain,
        )?)
    }

    /// Copy of this context using `mode` for flag selection.
    #[must_use]
    pub fn with_mode(&self, mode: BuildMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Project name from the configuration.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Host platform whose overlays apply.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Active build mode.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Absolute project root.
    #[must_use]
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// Project root with forward slashes, as substituted for `{root}`.
    #[must_use]
    pub fn project_root_slashed(&self) -> String {
        self.project_root.as_str().replace('\\', "/")
    }

    /// Directory receiving the executable and copied assets.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Directory receiving objects and dependency files.
    #[must_use]
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    /// Resolved compiler drivers.
    #[must_use]
    pub const fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Platform-appropriate executable file name, e.g. `game.exe`.
    #[must_use]
    pub fn executable_name(&self) -> String {
        self.platform.executable_name(&self.project_name)
    }

    /// Path of the linked executable inside the output directory.
    #[must_use]
    pub fn executable_path(&self) -> Utf8PathBuf {
        self.output_dir.join(self.executable_name())
    }

    /// Object file path for `source`.
    ///
    /// The source's base name loses its language extension (or, failing
    /// that, whatever extension it has) and gains the object extension.
    /// Two sources sharing a base name map to the same object.
    #[must_use]
    pub fn object_path(&self, source: &Utf8Path, language: Language) -> Utf8PathBuf {
        self.cache_artifact(source, language, OBJECT_EXTENSION)
    }

    /// Dependency file path written alongside the object for `source`.
    #[must_use]
    pub fn depfile_path(&self, source: &Utf8Path, language: Language) -> Utf8PathBuf {
        self.cache_artifact(source, language, DEPFILE_EXTENSION)
    }

    fn cache_artifact(&self, source: &Utf8Path, language: Language, ext: &str) -> Utf8PathBuf {
        let file_name = source.file_name().unwrap_or(source.as_str());
        let language_suffix = format!(".{}", language.source_extension());
        let stem = file_name
            .strip_suffix(language_suffix.as_str())
            .or_else(|| source.file_stem())
            .unwrap_or(file_name);
        self.cache_dir.join(format!("{stem}.{ext}"))
    }
}
