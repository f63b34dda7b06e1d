//! Compilation of a single target.

use super::patterns::expand_patterns;
use super::{BuildError, BuildSession};
use crate::config::Target;
use crate::platform::Platform;
use crate::runner::ToolCommand;
use crate::staleness::rebuild_reason;
use crate::status::BuildEvent;
use crate::toolchain::{CompileInvocation, Language, std_flag};
use camino::Utf8PathBuf;
use tracing::{debug, warn};

impl BuildSession<'_> {
    /// Compile the stale sources of `target` and return every object path
    /// in source order, whether or not it was recompiled.
    ///
    /// A target whose patterns match nothing emits a warning and contributes
    /// no objects.
    ///
    /// # Errors
    ///
    /// Returns an error when a pattern is invalid or the compiler fails. No
    /// further sources are attempted after a failure.
    pub fn build_target(
        &mut self,
        name: &str,
        target: &Target,
    ) -> Result<Vec<Utf8PathBuf>, BuildError> {
        let sources = expand_patterns(&target.sources)?;
        if sources.is_empty() {
            warn!(target = name, "no sources matched");
            self.reporter.report(&BuildEvent::NoSources { target: name });
            return Ok(Vec::new());
        }

        let ctx = self.ctx;
        let includes: Vec<Utf8PathBuf> = target
            .includes
            .iter()
            .chain(overlay_includes(target, ctx.platform()))
            .cloned()
            .collect();
        let flags: Vec<String> = target
            .mode_flags(ctx.mode())
            .iter()
            .map(|flag| self.expander.expand(flag))
            .collect();
        let language = Language::from_tag(&target.language);
        let std = std_flag(&target.language);
        let driver = ctx.toolchain().driver(language);
        debug!(target = name, sources = sources.len(), %driver, "building target");

        let mut objects = Vec::with_capacity(sources.len());
        for source in &sources {
            let object = ctx.object_path(source, language);
            let depfile = ctx.depfile_path(source, language);
            if let Some(previous) = self.claim_object(&object, source) {
                warn!(%object, %previous, %source, "sources share an object file");
            }
            if let Some(reason) = rebuild_reason(source, &object, &depfile) {
                debug!(%source, %reason, "recompiling");
                let args = CompileInvocation {
                    std_flag: &std,
                    depfile: &depfile,
                    flags: &flags,
                    includes: &includes,
                    source,
                    object: &object,
                }
                .args();
                self.runner.run(&ToolCommand::new(driver.as_str()).args(args))?;
                self.stats.compiled += 1;
            } else {
                self.reporter.report(&BuildEvent::Skip { source });
                self.stats.skipped += 1;
            }
            objects.push(object);
        }
        Ok(objects)
    }
}

/// Includes from the overlay for `platform`, appended after the target's own.
fn overlay_includes(target: &Target, platform: Platform) -> impl Iterator<Item = &Utf8PathBuf> {
    target
        .overlay(platform)
        .into_iter()
        .flat_map(|overlay| overlay.includes.iter())
}
