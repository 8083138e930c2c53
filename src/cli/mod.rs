//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for fund using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// fund - market fundamentals and economic indicators into SQL databases
#[derive(Parser, Debug)]
#[command(name = "fund")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json", env = "FUND_CONFIG_FILE")]
    pub config_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FUND_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and store fundamentals for symbols, or an economic indicator
    Add(commands::add::AddArgs),

    /// Configure, provision and inspect the database
    Db(commands::db::DbArgs),

    /// Manage the FRED API key
    Fred(commands::fred::FredArgs),
}
