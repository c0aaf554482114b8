//! Tooling & Integration Layer
//!
//! Command-line entry points built on the decode and format layer.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
