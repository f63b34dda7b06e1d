//! Host platform detection.
//!
//! Platform overlays in `larva.toml` are keyed by the identifiers defined
//! here. Only the overlay matching the detected host is ever consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform identifier used to key per-platform overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Microsoft Windows hosts.
    Windows,
    /// Every other host. The identifier is `linux` for compatibility with
    /// existing project files.
    Linux,
}

impl Platform {
    /// Return the platform the current process is running on.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Identifier used as the overlay key in project files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
        }
    }

    /// Suffix appended to linked executables.
    #[must_use]
    pub const fn exe_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Linux => "",
        }
    }

    /// Platform-appropriate executable file name for `name`.
    ///
    /// ```
    /// use larva::platform::Platform;
    /// assert_eq!(Platform::Windows.executable_name("game"), "game.exe");
    /// assert_eq!(Platform::Linux.executable_name("game"), "game");
    /// ```
    #[must_use]
    pub fn executable_name(self, name: &str) -> String {
        format!("{name}{}", self.exe_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
