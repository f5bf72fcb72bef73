//! CLI argument definitions using clap
//!
//! - modelshell [--config <path>] [--file <path>]

use clap::Parser;
use std::path::PathBuf;

/// modelshell - a command shell over a flat JSON record store
#[derive(Parser, Debug)]
#[command(name = "modelshell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Storage file, overriding the configured one
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
