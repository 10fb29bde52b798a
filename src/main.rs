// cola - build CoLa contracts from the command line
//
// Architecture:
// - Library (cola_builder): grammar validator, spec loader, contract model
// - Config: env > ~/.config/cola/config.toml > defaults
// - Logging: tracing to stderr, optional rolling JSON files
// - CLI: one document operation per invocation, saved as a JSON snapshot

mod cli;
mod config;
mod demo;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config commands run before the config file is created or read
    if cli.is_config_command() {
        cli::handle_config(&cli.command)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env()?;

    // The guard must outlive every log call so the file writer flushes
    let _file_guard = logging::init(&config.logging);

    tracing::debug!(
        "Spec: {}, document: {}",
        config.spec_path.display(),
        config.snapshot_path.display()
    );

    cli::run(cli, &config)
}
