//! The incremental build engine.
//!
//! A [`BuildSession`] borrows the loaded [`Config`] and a resolved
//! [`BuildContext`], then drives one build: the executable's direct
//! dependencies are compiled first, then the executable itself, then every
//! object is linked and the post-build steps run. Dependencies are one level
//! deep; a dependency's own `deps` list is not followed.
//!
//! All external tools go through the session's [`CommandRunner`], so tests
//! can substitute a recording runner and inspect the exact command lines.

mod error;
mod patterns;
mod post_build;
mod target;

pub use error::BuildError;

use crate::config::{Config, Target};
use crate::context::BuildContext;
use crate::runner::{CommandRunner, ToolCommand};
use crate::status::StatusReporter;
use crate::toolchain::{Language, LinkInvocation};
use crate::vars::VariableExpander;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use tracing::debug;

/// Counters describing what a session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Sources handed to the compiler.
    pub compiled: usize,
    /// Sources found up to date.
    pub skipped: usize,
    /// Assets copied into the output directory.
    pub copied: usize,
    /// Whether the link step ran.
    pub linked: bool,
}

/// One build invocation.
pub struct BuildSession<'a> {
    config: &'a Config,
    ctx: &'a BuildContext,
    expander: VariableExpander<'a>,
    runner: &'a mut dyn CommandRunner,
    reporter: &'a dyn StatusReporter,
    objects_seen: HashMap<Utf8PathBuf, Utf8PathBuf>,
    stats: BuildStats,
}

impl<'a> BuildSession<'a> {
    /// Prepare a session. Nothing touches the filesystem until a build
    /// method is called.
    #[must_use]
    pub fn new(
        config: &'a Config,
        ctx: &'a BuildContext,
        runner: &'a mut dyn CommandRunner,
        reporter: &'a dyn StatusReporter,
    ) -> Self {
        Self {
            config,
            ctx,
            expander: VariableExpander::new(ctx, &config.project.vars),
            runner,
            reporter,
            objects_seen: HashMap::new(),
            stats: BuildStats::default(),
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Create the output and cache directories if they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CreateDir`] when a directory cannot be created.
    pub fn ensure_dirs(&self) -> Result<(), BuildError> {
        for dir in [self.ctx.output_dir(), self.ctx.cache_dir()] {
            fs::create_dir_all(dir).map_err(|source| BuildError::CreateDir {
                path: dir.to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    /// Build the executable and its dependencies, link, then run the
    /// post-build steps.
    ///
    /// A project without an executable target only runs the post-build
    /// steps. Dependency names are validated before anything is compiled.
    ///
    /// # Errors
    ///
    /// Returns the first failure; objects produced before it stay on disk.
    pub fn build_all(&mut self) -> Result<BuildStats, BuildError> {
        self.ensure_dirs()?;
        let config = self.config;
        if let Some((name, exe)) = config.executable()? {
            let deps = config.dependencies(name, exe)?;
            let mut objects = Vec::new();
            for (dep_name, dep) in deps {
                objects.extend(self.build_target(dep_name, dep)?);
            }
            objects.extend(self.build_target(name, exe)?);
            self.link(exe, &objects)?;
        } else {
            debug!("no executable target declared; running post-build steps only");
        }
        self.run_post_build()?;
        Ok(self.stats)
    }

    /// Link `objects` into the executable using the driver for `exe`'s
    /// language. Linking is unconditional.
    fn link(&mut self, exe: &Target, objects: &[Utf8PathBuf]) -> Result<(), BuildError> {
        let ctx = self.ctx;
        let overlay = exe.overlay(ctx.platform());
        let output = ctx.executable_path();
        let args = LinkInvocation {
            objects,
            output: &output,
            lib_dirs: overlay.map_or(&[], |o| o.libdirs.as_slice()),
            links: overlay.map_or(&[], |o| o.links.as_slice()),
        }
        .args();
        let driver = ctx.toolchain().driver(Language::from_tag(&exe.language));
        debug!(%output, objects = objects.len(), "linking");
        self.runner.run(&ToolCommand::new(driver.as_str()).args(args))?;
        self.stats.linked = true;
        Ok(())
    }

    /// Remember which source produced `object`; returns the earlier source
    /// when two sources collide.
    fn claim_object(&mut self, object: &Utf8Path, source: &Utf8Path) -> Option<Utf8PathBuf> {
        self.objects_seen
            .insert(object.to_owned(), source.to_owned())
            .filter(|previous| previous != source)
    }
}
