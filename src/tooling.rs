//! Tooling & Integration Layer
//!
//! Command-line access to the synchronizer for canonical definition documents.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
