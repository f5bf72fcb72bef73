//! CLI module for modelshell
//!
//! Boots the storage engine from configuration and runs the interactive
//! console on stdin/stdout.

mod args;
mod commands;
mod config;
mod errors;

pub use args::Cli;
pub use commands::{boot_storage, load_config, run, start};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
