//! CLI command implementations
//!
//! Startup sequence (strict order):
//! 1. Configuration load
//! 2. Log threshold set
//! 3. Storage reload (corruption is FATAL, no partial start)
//! 4. Interactive loop on stdin/stdout

use std::io::{self, IsTerminal};
use std::path::Path;

use crate::console::Console;
use crate::model::TypeRegistry;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::storage::FileStorage;

use super::args::Cli;
use super::config::Config;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and runs the shell.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    start(cli.config.as_deref(), cli.file.as_deref())
}

/// Boot and run the shell on the process's stdin/stdout
pub fn start(config_path: Option<&Path>, file_override: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path, file_override)?;
    let storage = boot_storage(&config)?;

    let stdin = io::stdin();
    let prompt = stdin.is_terminal().then_some(config.prompt.as_str());

    let mut console = Console::new(storage, io::stdout());
    console.run(stdin.lock(), prompt)?;
    Ok(())
}

/// Resolve configuration and apply the log threshold
pub fn load_config(config_path: Option<&Path>, file_override: Option<&Path>) -> CliResult<Config> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(file) = file_override {
        config.storage_path = file.to_string_lossy().into_owned();
    }

    Logger::set_min_severity(config.severity());
    log_event(Event::BootStart);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("log_level", &config.log_level),
            ("storage_path", &config.storage_path),
        ],
    );

    Ok(config)
}

/// Open the storage engine with the standard registry
///
/// FATAL: a storage file that exists but cannot be loaded halts startup.
pub fn boot_storage(config: &Config) -> CliResult<FileStorage> {
    FileStorage::open(config.storage_file(), TypeRegistry::standard()).map_err(|e| {
        CliError::boot_failed(format!(
            "Storage load failed: {}. Refusing to start over unreadable data.",
            e
        ))
    })
}
