//! Database abstraction traits
//!
//! This module defines the traits that SQL backends must implement. A
//! [`SqlConnector`] opens one [`SqlSession`] per operation; the caller is
//! responsible for calling [`SqlSession::close`] on every exit path, usually
//! via [`close_session`].

use crate::config::ConnectionDescriptor;
use crate::domain::{ColumnInfo, FundamentalRecord, Observation, Result};
use async_trait::async_trait;
use std::fmt;

/// Supported SQL server families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBackend {
    /// Microsoft SQL Server
    SqlServer,
    /// PostgreSQL
    PostgreSql,
}

impl SqlBackend {
    /// Picks the backend from a configured driver name
    ///
    /// Any name mentioning PostgreSQL selects PostgreSQL; everything else,
    /// including the default ODBC driver name, selects SQL Server.
    pub fn from_driver_name(driver: &str) -> Self {
        if driver.to_lowercase().contains("postgres") {
            SqlBackend::PostgreSql
        } else {
            SqlBackend::SqlServer
        }
    }

    /// Database to connect to for server-level administration
    pub fn admin_database(&self) -> &'static str {
        match self {
            SqlBackend::SqlServer => "master",
            SqlBackend::PostgreSql => "postgres",
        }
    }

    /// Product name for messages
    pub fn product_name(&self) -> &'static str {
        match self {
            SqlBackend::SqlServer => "SQL Server",
            SqlBackend::PostgreSql => "PostgreSQL",
        }
    }

    /// Port used when the host does not specify one
    pub fn default_port(&self) -> u16 {
        match self {
            SqlBackend::SqlServer => 1433,
            SqlBackend::PostgreSql => 5432,
        }
    }
}

impl fmt::Display for SqlBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_name())
    }
}

/// Opens database sessions
#[async_trait]
pub trait SqlConnector: Send + Sync {
    /// Backend this connector talks to
    fn backend(&self) -> SqlBackend;

    /// Opens a session on `database` using the credentials in `descriptor`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::FundError::Validation`] when the descriptor is
    /// incomplete and [`crate::domain::FundError::Connectivity`] when the server
    /// cannot be reached or rejects the login.
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn SqlSession>>;
}

#[async_trait]
impl<T: SqlConnector + ?Sized> SqlConnector for Box<T> {
    fn backend(&self) -> SqlBackend {
        (**self).backend()
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn SqlSession>> {
        (**self).connect(descriptor, database).await
    }
}

/// One open database connection
///
/// Table names passed to these methods are identifiers, not values; every
/// implementation quotes them for its dialect before use.
#[async_trait]
pub trait SqlSession: Send {
    /// Server version banner
    async fn server_version(&mut self) -> Result<String>;

    /// Whether a database named `name` exists on the server
    async fn database_exists(&mut self, name: &str) -> Result<bool>;

    /// Creates database `name`
    async fn create_database(&mut self, name: &str) -> Result<()>;

    /// Base tables whose name starts with `prefix`
    async fn list_tables(&mut self, prefix: &str) -> Result<Vec<String>>;

    /// Number of rows in `table`
    async fn row_count(&mut self, table: &str) -> Result<i64>;

    /// Latest non-null `lastUpdate` in `table`, as text
    async fn latest_update(&mut self, table: &str) -> Result<Option<String>>;

    /// Column metadata of `table` in ordinal order
    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Creates the fundamentals table `table` if missing
    async fn ensure_fundamental_table(&mut self, table: &str) -> Result<()>;

    /// Replaces the row for `record.symbol` in `table`
    async fn upsert_fundamental(&mut self, table: &str, record: &FundamentalRecord)
        -> Result<()>;

    /// Creates the indicator table `table` if missing
    async fn ensure_indicator_table(&mut self, table: &str) -> Result<()>;

    /// Replaces the rows for the observations' dates; returns rows written
    async fn upsert_observations(
        &mut self,
        table: &str,
        observations: &[Observation],
    ) -> Result<usize>;

    /// Closes the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Closes `session`, logging instead of failing
///
/// Used on every exit path after an operation; a close failure never masks
/// the operation's own result.
pub async fn close_session(session: Box<dyn SqlSession>) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close database session cleanly");
    }
}
