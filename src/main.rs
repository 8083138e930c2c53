// fund - Market Fundamentals to SQL Database Tool
// Copyright (c) 2025 fund Contributors
// Licensed under the MIT License

use clap::Parser;
use fund::cli::{Cli, Commands};
use fund::config::LoggingConfig;
use fund::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console logging on stderr; file logging only when FUND_LOG_DIR is set
    let log_level = cli.log_level.as_deref().unwrap_or("warn");
    let guard = match init_logging(log_level, &LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fund starting");

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // Flush the file writer before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Add(args) => args.execute(&cli.config_file).await,
        Commands::Db(args) => args.execute(&cli.config_file).await,
        Commands::Fred(args) => args.execute(&cli.config_file).await,
    }
}
