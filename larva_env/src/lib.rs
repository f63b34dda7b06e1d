#![forbid(unsafe_code)]

//! Shared environment constants used across larva crates (library, tests, and
//! helpers).

/// Environment variable override for the C compiler driver.
///
/// When set, the value replaces the driver chosen by the project's compiler
/// family for every target whose language is not C++.
///
/// # Examples
///
/// ```
/// use larva_env::CC_ENV;
/// assert_eq!(CC_ENV, "LARVA_CC");
/// ```
pub const CC_ENV: &str = "LARVA_CC";

/// Environment variable override for the C++ compiler driver.
///
/// ```
/// use larva_env::CXX_ENV;
/// assert_eq!(CXX_ENV, "LARVA_CXX");
/// ```
pub const CXX_ENV: &str = "LARVA_CXX";
