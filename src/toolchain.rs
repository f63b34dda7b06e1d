//! Compiler family selection and command-line construction.
//!
//! The orchestrator never compiles anything itself. It picks a driver from
//! the project's compiler family and the target's language tag, then lays out
//! compile and link arguments in a fixed order so diagnostics stay
//! reproducible between runs.

use camino::{Utf8Path, Utf8PathBuf};
use larva_env::{CC_ENV, CXX_ENV};
use serde::{Deserialize, Serialize};
use std::{env, ffi::OsString, path::PathBuf};

/// Extension given to object files in the cache directory.
pub const OBJECT_EXTENSION: &str = "o";
/// Extension given to compiler-generated dependency files.
pub const DEPFILE_EXTENSION: &str = "d";

/// Supported compiler families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompilerFamily {
    /// GNU Compiler Collection (`gcc` / `g++`).
    #[default]
    #[serde(rename = "gcc", alias = "gnu")]
    Gnu,
    /// LLVM Clang (`clang` / `clang++`).
    #[serde(rename = "clang")]
    Clang,
}

impl CompilerFamily {
    /// Default C driver for the family.
    #[must_use]
    pub const fn c_driver(self) -> &'static str {
        match self {
            Self::Gnu => "gcc",
            Self::Clang => "clang",
        }
    }

    /// Default C++ driver for the family.
    #[must_use]
    pub const fn cxx_driver(self) -> &'static str {
        match self {
            Self::Gnu => "g++",
            Self::Clang => "clang++",
        }
    }
}

/// Source language derived from a target's language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Any tag not starting with `c++`.
    C,
    /// Tags such as `c++17` or `c++20`.
    Cxx,
}

impl Language {
    /// Classify a language tag such as `c99` or `c++20`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with("c++") {
            Self::Cxx
        } else {
            Self::C
        }
    }

    /// Extension expected on source files of this language.
    #[must_use]
    pub const fn source_extension(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cxx => "cpp",
        }
    }
}

/// Language standard flag for a tag, e.g. `-std=c++20`.
#[must_use]
pub fn std_flag(tag: &str) -> String {
    format!("-std={tag}")
}

/// Resolved compiler drivers for both languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    c: Utf8PathBuf,
    cxx: Utf8PathBuf,
}

impl Toolchain {
    /// Use the family's stock driver names with no overrides.
    #[must_use]
    pub fn for_family(family: CompilerFamily) -> Self {
        Self {
            c: Utf8PathBuf::from(family.c_driver()),
            cxx: Utf8PathBuf::from(family.cxx_driver()),
        }
    }

    /// Resolve drivers for `family`, honouring [`CC_ENV`] and [`CXX_ENV`].
    #[must_use]
    pub fn from_env(family: CompilerFamily) -> Self {
        Self::from_env_with(family, |key| env::var_os(key))
    }

    fn from_env_with<F>(family: CompilerFamily, mut read_env: F) -> Self
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        let mut resolve = |key: &str, fallback: &str| {
            read_env(key)
                .filter(|value| !value.is_empty())
                .and_then(|value| Utf8PathBuf::from_path_buf(PathBuf::from(value)).ok())
                .unwrap_or_else(|| Utf8PathBuf::from(fallback))
        };
        let c = resolve(CC_ENV, family.c_driver());
        let cxx = resolve(CXX_ENV, family.cxx_driver());
        Self { c, cxx }
    }

    /// Driver used to compile and link `language` sources.
    #[must_use]
    pub fn driver(&self, language: Language) -> &Utf8Path {
        match language {
            Language::C => &self.c,
            Language::Cxx => &self.cxx,
        }
    }
}

/// Arguments for compiling one translation unit.
#[derive(Debug, Clone, Copy)]
pub struct CompileInvocation<'a> {
    /// Language standard flag, see [`std_flag`].
    pub std_flag: &'a str,
    /// Dependency file the compiler should write.
    pub depfile: &'a Utf8Path,
    /// Mode flags, already variable-expanded.
    pub flags: &'a [String],
    /// Include directories in search order.
    pub includes: &'a [Utf8PathBuf],
    /// Source file to compile.
    pub source: &'a Utf8Path,
    /// Object file to produce.
    pub object: &'a Utf8Path,
}

impl CompileInvocation<'_> {
    /// Lay out the compiler arguments.
    ///
    /// ```
    /// use camino::{Utf8Path, Utf8PathBuf};
    /// use larva::toolchain::CompileInvocation;
    ///
    /// let includes = [Utf8PathBuf::from("include")];
    /// let args = CompileInvocation {
    ///     std_flag: "-std=c99",
    ///     depfile: Utf8Path::new("obj/a.d"),
    ///     flags: &["-g".to_owned()],
    ///     includes: &includes,
    ///     source: Utf8Path::new("src/a.c"),
    ///     object: Utf8Path::new("obj/a.o"),
    /// }
    /// .args();
    /// assert_eq!(
    ///     args,
    ///     ["-c", "-std=c99", "-w", "-MMD", "-MF", "obj/a.d", "-g", "-Iinclude", "src/a.c", "-o", "obj/a.o"]
    /// );
    /// ```
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(9 + self.flags.len() + self.includes.len());
        args.extend(["-c", self.std_flag, "-w", "-MMD", "-MF"].map(str::to_owned));
        args.push(self.depfile.to_string());
        args.extend(self.flags.iter().cloned());
        args.extend(self.includes.iter().map(|dir| format!("-I{dir}")));
        args.push(self.source.to_string());
        args.push("-o".to_owned());
        args.push(self.object.to_string());
        args
    }
}

/// Arguments for linking the final executable.
#[derive(Debug, Clone, Copy)]
pub struct LinkInvocation<'a> {
    /// Object files in link order.
    pub objects: &'a [Utf8PathBuf],
    /// Executable path to produce.
    pub output: &'a Utf8Path,
    /// Library search directories.
    pub lib_dirs: &'a [Utf8PathBuf],
    /// Library names passed as `-l<name>`.
    pub links: &'a [String],
}

impl LinkInvocation<'_> {
    /// Lay out the linker arguments.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args =
            Vec::with_capacity(self.objects.len() + 2 + self.lib_dirs.len() + self.links.len());
        args.extend(self.objects.iter().map(ToString::to_string));
        args.push("-o".to_owned());
        args.push(self.output.to_string());
        args.extend(self.lib_dirs.iter().map(|dir| format!("-L{dir}")));
        args.extend(self.links.iter().map(|lib| format!("-l{lib}")));
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c99", Language::C)]
    #[case("c11", Language::C)]
    #[case("c++20", Language::Cxx)]
    #[case("c++17", Language::Cxx)]
    #[case("gnu++17", Language::C)]
    fn language_follows_cxx_prefix(#[case] tag: &str, #[case] expected: Language) {
        assert_eq!(Language::from_tag(tag), expected);
    }

    #[rstest]
    #[case(CompilerFamily::Gnu, Language::C, "gcc")]
    #[case(CompilerFamily::Gnu, Language::Cxx, "g++")]
    #[case(CompilerFamily::Clang, Language::C, "clang")]
    #[case(CompilerFamily::Clang, Language::Cxx, "clang++")]
    fn family_selects_driver(
        #[case] family: CompilerFamily,
        #[case] language: Language,
        #[case] expected: &str,
    ) {
        let toolchain = Toolchain::from_env_with(family, |_| None);
        assert_eq!(toolchain.driver(language), Utf8Path::new(expected));
    }

    #[test]
    fn env_overrides_replace_drivers() {
        let toolchain = Toolchain::from_env_with(CompilerFamily::Gnu, |key| match key {
            CC_ENV => Some(OsString::from("/opt/cc")),
            CXX_ENV => Some(OsString::from("/opt/cxx")),
            _ => None,
        });
        assert_eq!(toolchain.driver(Language::C), Utf8Path::new("/opt/cc"));
        assert_eq!(toolchain.driver(Language::Cxx), Utf8Path::new("/opt/cxx"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let toolchain = Toolchain::from_env_with(CompilerFamily::Clang, |_| Some(OsString::new()));
        assert_eq!(toolchain, Toolchain::for_family(CompilerFamily::Clang));
    }

    #[test]
    fn link_args_place_objects_before_search_paths() {
        let objects = [Utf8PathBuf::from("obj/lib.o"), Utf8PathBuf::from("obj/a.o")];
        let lib_dirs = [Utf8PathBuf::from("vendor/lib")];
        let links = ["SDL2".to_owned(), "m".to_owned()];
        let args = LinkInvocation {
            objects: &objects,
            output: Utf8Path::new("build/game"),
            lib_dirs: &lib_dirs,
            links: &links,
        }
        .args();
        assert_eq!(
            args,
            [
                "obj/lib.o",
                "obj/a.o",
                "-o",
                "build/game",
                "-Lvendor/lib",
                "-lSDL2",
                "-lm"
            ]
        );
    }
}
