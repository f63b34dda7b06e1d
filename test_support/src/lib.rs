//! Test utilities for build orchestration tests.
//!
//! This crate provides fake compiler scripts that record their invocations,
//! an in-process recording runner and reporter, temporary project trees, and
//! modification-time helpers.

pub mod fake_compiler;
pub mod mtime;
pub mod project;
pub mod recording;

pub use fake_compiler::FakeCompiler;
pub use project::TempProject;
pub use recording::{RecordingReporter, RecordingRunner};
