//! Larva core library.
//!
//! Larva reads a `larva.toml` project description, recompiles the C and C++
//! sources whose objects are out of date, links the executable, and runs
//! post-build asset copies and hooks. The binary in `main.rs` is a thin shell
//! over [`runner::run`]; every other module is usable on its own.

pub mod build;
pub mod cli;
pub mod config;
pub mod context;
pub mod manifest;
pub mod platform;
pub mod runner;
pub mod staleness;
pub mod status;
pub mod toolchain;
pub mod vars;
