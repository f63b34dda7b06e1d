//! `{placeholder}` substitution for flags, hooks and command steps.
//!
//! Built-in placeholders form a closed set ([`Placeholder`]); project
//! variables from `[project.vars]` come after them. Substitution is a single
//! left-to-right pass, so replacement text is never rescanned and an
//! unrecognised `{token}` is copied through verbatim. There is no escape
//! syntax.

use crate::context::BuildContext;
use indexmap::IndexMap;

/// Built-in placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{root}`: absolute project root with forward slashes.
    ProjectRoot,
    /// `{output}`: the output directory.
    Output,
    /// `{exe}`: platform-appropriate executable name.
    Exe,
}

impl Placeholder {
    /// Every built-in placeholder.
    pub const ALL: [Self; 3] = [Self::ProjectRoot, Self::Output, Self::Exe];

    /// Token written between braces.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::ProjectRoot => "root",
            Self::Output => "output",
            Self::Exe => "exe",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

/// Expands placeholders against one build context.
#[derive(Debug, Clone)]
pub struct VariableExpander<'a> {
    root: String,
    output: String,
    exe: String,
    user: &'a IndexMap<String, String>,
}

impl<'a> VariableExpander<'a> {
    /// Capture built-in values from `ctx` and borrow the project variables.
    #[must_use]
    pub fn new(ctx: &BuildContext, user: &'a IndexMap<String, String>) -> Self {
        Self {
            root: ctx.project_root_slashed(),
            output: ctx.output_dir().to_string(),
            exe: ctx.executable_name(),
            user,
        }
    }

    /// Value bound to `name`, built-ins first.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        Placeholder::from_token(name).map_or_else(
            || self.user.get(name).map(String::as_str),
            |placeholder| Some(self.builtin(placeholder)),
        )
    }

    fn builtin(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::ProjectRoot => self.root.as_str(),
            Placeholder::Output => self.output.as_str(),
            Placeholder::Exe => self.exe.as_str(),
        }
    }

    /// Substitute every recognised `{name}` in `template`.
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use indexmap::IndexMap;
    /// use larva::config::Config;
    /// use larva::context::{BuildContext, BuildMode};
    /// use larva::platform::Platform;
    /// use larva::toolchain::{CompilerFamily, Toolchain};
    /// use larva::vars::VariableExpander;
    ///
    /// let config: Config = toml::from_str("[project]\nname = \"game\"\n").expect("parse");
    /// let ctx = BuildContext::resolve(
    ///     &config,
    ///     Platform::Linux,
    ///     BuildMode::Debug,
    ///     Utf8PathBuf::from("/src/game"),
    ///     Toolchain::for_family(CompilerFamily::Gnu),
    /// )
    /// .expect("context");
    /// let mut vars = IndexMap::new();
    /// vars.insert("assets".to_owned(), "data".to_owned());
    /// let expander = VariableExpander::new(&ctx, &vars);
    /// assert_eq!(
    ///     expander.expand("{output}/{exe} {assets} {unknown}"),
    ///     "build/game data {unknown}"
    /// );
    /// ```
    #[must_use]
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some((before, after_open)) = rest.split_once('{') {
            out.push_str(before);
            let substitution = after_open
                .split_once('}')
                .and_then(|(name, tail)| self.resolve(name).map(|value| (value, tail)));
            if let Some((value, tail)) = substitution {
                out.push_str(value);
                rest = tail;
            } else {
                out.push('{');
                rest = after_open;
            }
        }
        out.push_str(rest);
        out
    }
}
