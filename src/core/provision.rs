//! Database provisioning and introspection
//!
//! [`DatabaseProvisioner`] backs the `fund db` command: it checks that the
//! configured server is reachable, creates the target database on first use
//! and describes the tables this tool has written.
//!
//! Every operation opens its own session and closes it before returning,
//! whatever the outcome. Descriptor problems are reported as
//! [`FundError::Validation`] before any connection is attempted.

use crate::adapters::database::traits::{close_session, SqlConnector, SqlSession};
use crate::config::ConnectionDescriptor;
use crate::domain::{DatabaseStatus, FundError, Result, TableInfo, TABLE_PREFIX};

/// Column whose maximum is reported as a table's last update
const LAST_UPDATE_COLUMN: &str = "lastUpdate";

/// Provisions and inspects the configured database
pub struct DatabaseProvisioner<C> {
    connector: C,
}

impl<C: SqlConnector> DatabaseProvisioner<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// The connector sessions are opened with
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Validates `descriptor` and opens a session on its target database
    async fn open_target(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn SqlSession>> {
        let database = descriptor.require_database_name()?;
        descriptor.validate_for_connect()?;
        self.connector.connect(descriptor, database).await
    }

    /// Connects to the target database and returns the server version
    ///
    /// # Errors
    ///
    /// Returns a validation error for an incomplete descriptor, or the
    /// driver's error when the server cannot be reached or the query fails.
    pub async fn test_connection(&self, descriptor: &ConnectionDescriptor) -> Result<String> {
        let mut session = self.open_target(descriptor).await?;
        let result = session.server_version().await;
        close_session(session).await;

        match &result {
            Ok(version) => tracing::info!(
                backend = %self.connector.backend(),
                version = version.lines().next().unwrap_or_default(),
                "Connection test succeeded"
            ),
            Err(e) => tracing::warn!(error = %e, "Connection test failed"),
        }
        result
    }

    /// Creates the configured database unless it already exists
    ///
    /// The check and the create both run against the server's administrative
    /// database, so the target does not need to exist yet.
    pub async fn create_database_if_not_exists(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<DatabaseStatus> {
        let database = descriptor.require_database_name()?;
        descriptor.validate_for_connect()?;

        let admin = self.connector.backend().admin_database();
        let mut session = self.connector.connect(descriptor, admin).await?;

        let result: Result<DatabaseStatus> = async {
            if session.database_exists(database).await? {
                return Ok(DatabaseStatus::AlreadyExists);
            }
            session.create_database(database).await?;
            Ok(DatabaseStatus::Created)
        }
        .await;
        close_session(session).await;

        if let Ok(status) = &result {
            tracing::info!(database, ?status, "Ensured database exists");
        }
        result
    }

    /// Lists this tool's tables in the target database, sorted by name
    pub async fn list_tables(&self, descriptor: &ConnectionDescriptor) -> Result<Vec<String>> {
        let mut session = self.open_target(descriptor).await?;
        let result = session.list_tables(TABLE_PREFIX).await;
        close_session(session).await;

        if let Ok(tables) = &result {
            tracing::debug!(count = tables.len(), "Listed tables");
        }
        result
    }

    /// Describes one table from [`Self::list_tables`]
    ///
    /// Names outside that list are rejected, so arbitrary identifiers never
    /// reach a statement.
    pub async fn get_table_info(
        &self,
        descriptor: &ConnectionDescriptor,
        table: &str,
    ) -> Result<TableInfo> {
        let mut session = self.open_target(descriptor).await?;

        let result: Result<TableInfo> = async {
            let tables = session.list_tables(TABLE_PREFIX).await?;
            let Some(name) = tables.into_iter().find(|t| t == table) else {
                return Err(FundError::Validation(format!(
                    "table '{table}' does not exist or is not managed by fund"
                )));
            };

            let columns = session.columns(&name).await?;
            let row_count = session.row_count(&name).await?;
            let last_update = if columns.iter().any(|c| c.name == LAST_UPDATE_COLUMN) {
                session.latest_update(&name).await?
            } else {
                None
            };

            Ok(TableInfo {
                name,
                row_count,
                last_update,
                columns,
            })
        }
        .await;
        close_session(session).await;
        result
    }
}
