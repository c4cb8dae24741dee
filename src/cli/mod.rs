//! CLI module for cubequery
//!
//! Provides command-line interface for:
//! - serve: Register sources and serve the HTTP API
//! - check: Validate configuration and exit

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_engine, check, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
