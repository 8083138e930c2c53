//! SQL connector factory
//!
//! Picks the backend implementation from the configured driver name.

use crate::adapters::database::traits::{SqlBackend, SqlConnector};
use crate::adapters::postgresql::PostgresConnector;
use crate::adapters::sqlserver::SqlServerConnector;

/// Create a connector for the backend named by `driver_name`
///
/// A driver name mentioning PostgreSQL selects tokio-postgres; anything else
/// selects the SQL Server (TDS) connector.
pub fn create_connector(driver_name: &str) -> Box<dyn SqlConnector> {
    match SqlBackend::from_driver_name(driver_name) {
        SqlBackend::SqlServer => {
            tracing::debug!(driver = driver_name, "Using SQL Server connector");
            Box::new(SqlServerConnector::new())
        }
        SqlBackend::PostgreSql => {
            tracing::debug!(driver = driver_name, "Using PostgreSQL connector");
            Box::new(PostgresConnector::new())
        }
    }
}
