//! Db command implementation
//!
//! This module implements the `db` command: editing the stored connection
//! settings and running the provisioning checks against them.

use super::{confirm, exit_code, merge_exit_code, EXIT_OK};
use crate::adapters::database::{create_connector, SqlConnector};
use crate::config::{ConfigService, ConfigStore, ConnectionDescriptor, DatabaseUpdate};
use crate::core::DatabaseProvisioner;
use clap::Args;

/// Arguments for the db command
#[derive(Args, Debug, Default)]
pub struct DbArgs {
    /// Database server address (host, host,port or host:port)
    #[arg(long)]
    pub host: Option<String>,

    /// Database name
    #[arg(long)]
    pub database: Option<String>,

    /// Database user name
    #[arg(long)]
    pub user: Option<String>,

    /// Database user password
    #[arg(long)]
    pub password: Option<String>,

    /// Driver name; a name mentioning PostgreSQL selects the PostgreSQL backend
    #[arg(long)]
    pub driver: Option<String>,

    /// Clear all database settings
    #[arg(long)]
    pub clear: bool,

    /// Skip the confirmation prompt of --clear
    #[arg(short, long, requires = "clear")]
    pub yes: bool,

    /// Show the database settings
    #[arg(long)]
    pub config: bool,

    /// Test the database connection
    #[arg(long)]
    pub check: bool,

    /// List the tables written by fund
    #[arg(long)]
    pub tables: bool,

    /// Show row count, last update and columns of one table
    #[arg(long, value_name = "TABLE")]
    pub info: Option<String>,
}

impl DbArgs {
    /// Settings given on the command line, `None` when nothing would change
    pub fn update(&self) -> Option<DatabaseUpdate> {
        let update = DatabaseUpdate {
            host: self.host.clone(),
            database_name: self.database.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            driver_name: self.driver.clone(),
        };
        (!update.is_empty()).then_some(update)
    }

    fn has_actions(&self) -> bool {
        self.update().is_some() || self.config || self.check || self.tables || self.info.is_some()
    }

    /// Execute the db command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::debug!(config_path, "Running db command");
        let mut store = ConfigStore::load(config_path);

        if self.clear {
            if !self.yes && !confirm("Confirm to clear all database settings?")? {
                println!("Operation cancelled");
                return Ok(EXIT_OK);
            }
            return Ok(match ConfigService::new(&mut store).clear_database_config() {
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

        let mut code = EXIT_OK;

        let updated = match self.update() {
            Some(update) => match ConfigService::new(&mut store).update_database_config(update) {
                Ok(message) => Some(message),
                Err(e) => {
                    println!("✗ {e}");
                    return Ok(exit_code(&e));
                }
            },
            None => None,
        };

        let descriptor = store.connection_descriptor();
        let provisioner = DatabaseProvisioner::new(create_connector(&descriptor.driver_name));

        if let Some(message) = updated {
            print_config(&mut store);
            println!();
            code = merge_exit_code(code, ensure_database(&provisioner, &descriptor).await);
            println!("✓ {message}");
        }

        if self.config {
            print_config(&mut store);
        }

        if self.check {
            code = merge_exit_code(code, check_connection(&provisioner, &descriptor).await);
        }

        if self.tables {
            code = merge_exit_code(code, print_tables(&provisioner, &descriptor).await);
        }

        if let Some(table) = &self.info {
            code = merge_exit_code(code, print_table_info(&provisioner, &descriptor, table).await);
        }

        if !self.has_actions() {
            print_config(&mut store);
            println!();
            code = merge_exit_code(code, ensure_database(&provisioner, &descriptor).await);
            println!();
            code = merge_exit_code(code, check_connection(&provisioner, &descriptor).await);
            println!();
            code = merge_exit_code(code, print_tables(&provisioner, &descriptor).await);
        }

        Ok(code)
    }
}

fn print_config(store: &mut ConfigStore) {
    let view = ConfigService::new(store).show_database_config();
    for (field, value) in view.entries() {
        println!("  {field}: {value}");
    }
}

async fn ensure_database<C: SqlConnector>(
    provisioner: &DatabaseProvisioner<C>,
    descriptor: &ConnectionDescriptor,
) -> i32 {
    match provisioner.create_database_if_not_exists(descriptor).await {
        Ok(status) => {
            let name = descriptor.database_name.as_deref().unwrap_or_default();
            println!("  ✓ {}", status.message(name));
            EXIT_OK
        }
        Err(e) => {
            println!("  ✗ Failed to ensure database exists: {e}");
            exit_code(&e)
        }
    }
}

async fn check_connection<C: SqlConnector>(
    provisioner: &DatabaseProvisioner<C>,
    descriptor: &ConnectionDescriptor,
) -> i32 {
    match provisioner.test_connection(descriptor).await {
        Ok(version) => {
            println!("  ✓ Connection successful");
            if let Some(line) = version.lines().map(str::trim).find(|l| !l.is_empty()) {
                println!("    {line}");
            }
            EXIT_OK
        }
        Err(e) => {
            println!("  ✗ Connection failed: {e}");
            exit_code(&e)
        }
    }
}

async fn print_tables<C: SqlConnector>(
    provisioner: &DatabaseProvisioner<C>,
    descriptor: &ConnectionDescriptor,
) -> i32 {
    match provisioner.list_tables(descriptor).await {
        Ok(tables) if tables.is_empty() => {
            println!("  No tables available.");
            EXIT_OK
        }
        Ok(tables) => {
            for (i, table) in tables.iter().enumerate() {
                println!("  {}. {table}", i + 1);
            }
            EXIT_OK
        }
        Err(e) => {
            println!("  ✗ Failed to list tables: {e}");
            exit_code(&e)
        }
    }
}

async fn print_table_info<C: SqlConnector>(
    provisioner: &DatabaseProvisioner<C>,
    descriptor: &ConnectionDescriptor,
    table: &str,
) -> i32 {
    match provisioner.get_table_info(descriptor, table).await {
        Ok(info) => {
            println!("  Table: {}", info.name);
            println!("  Rows: {}", info.row_count);
            println!(
                "  Last update: {}",
                info.last_update.as_deref().unwrap_or("N/A")
            );
            println!("  Columns:");
            for column in &info.columns {
                println!("    {column}");
            }
            EXIT_OK
        }
        Err(e) => {
            println!("  ✗ Failed to read table info: {e}");
            exit_code(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_ignores_empty_values() {
        let args = DbArgs {
            host: Some(String::new()),
            user: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(args.update().is_none());
        assert!(!args.has_actions());
    }

    #[test]
    fn test_update_collects_fields() {
        let args = DbArgs {
            host: Some("localhost".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let update = args.update().unwrap();
        assert_eq!(update.host.as_deref(), Some("localhost"));
        assert_eq!(update.password.as_deref(), Some("secret"));
        assert!(update.database_name.is_none());
        assert!(args.has_actions());
    }

    #[tokio::test]
    async fn test_clear_with_yes_resets_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"db_server": "localhost", "db_name": "FundDB", "fred_api_key": "abcd1234efgh"}"#,
        )
        .unwrap();

        let args = DbArgs {
            clear: true,
            yes: true,
            ..Default::default()
        };
        let code = args.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_OK);

        let store = ConfigStore::load(&path);
        assert!(store.database().host.is_none());
        assert!(store.database().database_name.is_none());
        assert!(store.fred_api_key().is_some());
    }
}
