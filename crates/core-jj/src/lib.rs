//! Command execution boundary for the `jj` backend.
//!
//! `JjCommand` is a pure description of an invocation (argument vector plus a
//! mutating flag); `CommandRunner` executes one synchronously and returns its
//! captured stdout. Everything above this crate talks to the backend only
//! through these two types, so tests substitute a scripted runner.

pub mod command;
pub mod error;
pub mod root;
pub mod runner;

pub use command::{JjCommand, RebaseSource, RebaseTarget};
pub use error::RunError;
pub use root::{RepoRoot, repo_root};
pub use runner::{CommandRunner, ProcessRunner};
