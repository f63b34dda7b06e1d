//! Shell scripts that stand in for a C/C++ compiler driver.
//!
//! The script appends its arguments to `invocations.log` beside itself,
//! creates the file named by `-o`, writes a dependency listing to the file
//! named by `-MF` that mentions the source, and exits with a fixed code.
//! Failing scripts log the call and exit before producing anything.

use larva_env::{CC_ENV, CXX_ENV};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LOG_NAME: &str = "invocations.log";

/// A fake compiler living in its own temporary directory.
#[derive(Debug)]
pub struct FakeCompiler {
    dir: TempDir,
    path: PathBuf,
}

impl FakeCompiler {
    /// Create a fake compiler that exits with `exit_code`.
    ///
    /// # Panics
    ///
    /// Panics if the script cannot be written.
    #[must_use]
    pub fn new(exit_code: i32) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cc");
        let mut file = File::create(&path).expect("script");
        write!(
            file,
            r#"#!/bin/sh
log="$(dirname "$0")/{LOG_NAME}"
echo "$*" >> "$log"
[ {exit_code} -eq 0 ] || exit {exit_code}
out=""
dep=""
src=""
prev=""
for arg in "$@"; do
  case "$prev" in
    -o) out="$arg" ;;
    -MF) dep="$arg" ;;
  esac
  case "$arg" in
    *.c|*.cpp) src="$arg" ;;
  esac
  prev="$arg"
done
[ -n "$out" ] && : > "$out"
[ -n "$dep" ] && echo "$out: $src" > "$dep"
exit 0
"#
        )
        .expect("write script");
        drop(file);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path).expect("meta").permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).expect("perms");
        }
        Self { dir, path }
    }

    /// Path to the script.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Environment overrides pointing both drivers at this script.
    #[must_use]
    pub fn env(&self) -> [(&'static str, &Path); 2] {
        [(CC_ENV, self.path()), (CXX_ENV, self.path())]
    }

    /// Argument lines recorded so far, one per invocation.
    #[must_use]
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(LOG_NAME))
            .map(|log| log.lines().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Forget recorded invocations.
    ///
    /// # Panics
    ///
    /// Panics if the log exists but cannot be removed.
    pub fn clear(&self) {
        let log = self.dir.path().join(LOG_NAME);
        if log.exists() {
            fs::remove_file(log).expect("remove invocation log");
        }
    }
}
