// rxledger - Pharmacy claim reconciliation and analytics
// Copyright (c) 2025 rxledger Contributors
// Licensed under the MIT License

use clap::Parser;
use rxledger::cli::{Cli, Commands};
use rxledger::config::{load_config, LoggingConfig};
use rxledger::logging::init_logging;
use std::process;

fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (log_level, logging_config) = logging_settings(&cli);
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(e.exit_code());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "rxledger - pharmacy claim reconciliation and analytics"
    );

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Log level and logging setup for this invocation
///
/// File logging follows the configuration file when it loads; otherwise,
/// and for `init`, only the console is used.
fn logging_settings(cli: &Cli) -> (String, LoggingConfig) {
    let console_only = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };

    let (level, logging) = match &cli.command {
        Commands::Init(_) => ("info".to_string(), console_only),
        _ => match load_config(&cli.config) {
            Ok(config) => (config.application.log_level, config.logging),
            Err(_) => ("info".to_string(), console_only),
        },
    };

    (cli.log_level.clone().unwrap_or(level), logging)
}

fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config),
        Commands::ValidateConfig(args) => args.execute(&cli.config),
        Commands::Init(args) => args.execute(),
    }
}
