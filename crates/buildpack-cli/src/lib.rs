//! Buildpack CLI.
//!
//! Exposes configuration assembly and manifest classification from
//! `buildpack-core` on the command line.
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - Command implementations
//! - [`error`] - Error types and miette conversion
//! - [`logger`] - Structured logging with tracing

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;

pub use error::{CliError, Result};
