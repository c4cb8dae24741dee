//! CLI argument definitions using clap
//!
//! Commands:
//! - cubequery serve --config <path>
//! - cubequery check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cubequery - bounded execution of OLAP cube queries
#[derive(Parser, Debug)]
#[command(name = "cubequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register every configured source and serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./cubequery.json")]
        config: PathBuf,
    },

    /// Validate configuration and list the sources it registers
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./cubequery.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
