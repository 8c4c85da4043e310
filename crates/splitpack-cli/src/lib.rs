//! splitpack CLI.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - layered option loading
//! - [`commands`] - the build command
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal output

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
