//! Fred command implementation
//!
//! This module implements the `fred` command for managing the FRED API key.

use super::{confirm, exit_code, EXIT_OK};
use crate::config::{ConfigService, ConfigStore};
use clap::Args;

/// Arguments for the fred command
#[derive(Args, Debug, Default)]
pub struct FredArgs {
    /// Set the FRED API key
    #[arg(long, value_name = "API_KEY")]
    pub fred: Option<String>,

    /// Clear the FRED API key
    #[arg(long, conflicts_with = "fred")]
    pub clear: bool,

    /// Skip the confirmation prompt of --clear
    #[arg(short, long, requires = "clear")]
    pub yes: bool,
}

impl FredArgs {
    /// Execute the fred command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut store = ConfigStore::load(config_path);
        let mut service = ConfigService::new(&mut store);

        if self.clear {
            if !self.yes && !confirm("Confirm to clear FRED API Key?")? {
                println!("Operation cancelled");
                return Ok(EXIT_OK);
            }
            return Ok(match service.clear_api_key() {
                Ok(message) => {
                    println!("✓ {message}");
                    EXIT_OK
                }
                Err(e) => {
                    println!("✗ {e}");
                    exit_code(&e)
                }
            });
        }

        if let Some(key) = self.fred.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            match service.update_api_key(key) {
                Ok(message) => println!("✓ {message}"),
                Err(e) => {
                    println!("✗ {e}");
                    return Ok(exit_code(&e));
                }
            }
        }

        for (field, value) in service.show_api_key_config().entries() {
            println!("  {field}: {value}");
        }
        Ok(EXIT_OK)
    }
}
