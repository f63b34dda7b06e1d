//! Temporary project trees.

use camino::{Utf8Path, Utf8PathBuf};
use larva::config::Config;
use larva::context::{BuildContext, BuildMode};
use larva::manifest;
use larva::platform::Platform;
use larva::toolchain::Toolchain;
use std::fs;
use tempfile::TempDir;

/// Placeholder replaced by the project root in manifests passed to
/// [`TempProject::load`].
pub const ROOT_MARKER: &str = "@ROOT@";

/// A project directory that is deleted on drop.
#[derive(Debug)]
pub struct TempProject {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TempProject {
    /// Create an empty project directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or is not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        Self { _dir: dir, root }
    }

    /// Absolute project root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `name` inside the project.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    pub fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    /// Write `larva.toml` with [`ROOT_MARKER`] replaced by the project root.
    pub fn write_manifest(&self, body: &str) -> Utf8PathBuf {
        self.write(manifest::DEFAULT_MANIFEST, &body.replace(ROOT_MARKER, self.root.as_str()))
    }

    /// Parse `body` (with [`ROOT_MARKER`] substituted) and resolve a Linux
    /// debug context rooted here using the stock GNU drivers.
    ///
    /// # Panics
    ///
    /// Panics if the manifest is invalid.
    #[must_use]
    pub fn load(&self, body: &str) -> (Config, BuildContext) {
        let text = body.replace(ROOT_MARKER, self.root.as_str());
        let config = manifest::from_str(&text).expect("parse manifest");
        let ctx = BuildContext::resolve(
            &config,
            Platform::Linux,
            BuildMode::Debug,
            self.root.clone(),
            Toolchain::for_family(config.project.compiler),
        )
        .expect("resolve context");
        (config, ctx)
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}
