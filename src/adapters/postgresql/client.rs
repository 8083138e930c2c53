//! PostgreSQL client implementation
//!
//! This module provides the session for interacting with PostgreSQL. Each
//! session owns one `tokio_postgres` connection whose driver task is spawned
//! on open and awaited on close.

use crate::adapters::database::ident::{filter_prefixed, like_prefix_pattern, quote_pg_ident};
use crate::adapters::database::traits::{SqlBackend, SqlConnector, SqlSession};
use crate::config::ConnectionDescriptor;
use crate::domain::{
    ColumnInfo, FieldKind, FieldValue, FundError, FundamentalRecord, Observation, Result,
    FUNDAMENTAL_FIELDS,
};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

fn query_error(context: &str, err: tokio_postgres::Error) -> FundError {
    FundError::Query(format!("{context}: {err}"))
}

/// Opens PostgreSQL sessions
#[derive(Debug, Default, Clone)]
pub struct PostgresConnector;

impl PostgresConnector {
    pub fn new() -> Self {
        Self
    }

    fn build_config(
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<tokio_postgres::Config> {
        let (host, port) = descriptor.host_and_port()?;
        let username = descriptor.require_username()?;

        let mut config = tokio_postgres::Config::new();
        config
            .host(&host)
            .port(port.unwrap_or_else(|| SqlBackend::PostgreSql.default_port()))
            .user(username)
            .password(descriptor.password_str())
            .dbname(database)
            .application_name("fund");
        Ok(config)
    }
}

#[async_trait]
impl SqlConnector for PostgresConnector {
    fn backend(&self) -> SqlBackend {
        SqlBackend::PostgreSql
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn SqlSession>> {
        descriptor.validate_for_connect()?;
        let config = Self::build_config(descriptor, database)?;

        tracing::debug!(database, "Opening PostgreSQL session");

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| FundError::Connectivity(format!("Failed to connect to PostgreSQL: {e}")))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection terminated with error");
            }
        });

        Ok(Box::new(PostgresSession { client, driver }))
    }
}

/// One open PostgreSQL connection
pub struct PostgresSession {
    client: Client,
    driver: JoinHandle<()>,
}

fn sql_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "TEXT",
        FieldKind::Number => "DOUBLE PRECISION",
    }
}

#[async_trait]
impl SqlSession for PostgresSession {
    async fn server_version(&mut self) -> Result<String> {
        let row = self
            .client
            .query_one("SELECT version()", &[])
            .await
            .map_err(|e| query_error("Version query failed", e))?;
        Ok(row.get(0))
    }

    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let row = self
            .client
            .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
            .await
            .map_err(|e| query_error("Failed to query pg_database", e))?;
        Ok(row.is_some())
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        self.client
            .batch_execute(&format!("CREATE DATABASE {}", quote_pg_ident(name)))
            .await
            .map_err(|e| query_error("Failed to create database", e))
    }

    async fn list_tables(&mut self, prefix: &str) -> Result<Vec<String>> {
        let pattern = like_prefix_pattern(prefix);
        let rows = self
            .client
            .query(
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
                 AND table_name::text LIKE $1::text ESCAPE '\\'",
                &[&pattern],
            )
            .await
            .map_err(|e| query_error("Failed to list tables", e))?;

        let names = rows.iter().map(|row| row.get::<_, String>(0)).collect();
        Ok(filter_prefixed(names, prefix))
    }

    async fn row_count(&mut self, table: &str) -> Result<i64> {
        let row = self
            .client
            .query_one(
                format!("SELECT COUNT(*) FROM {}", quote_pg_ident(table)).as_str(),
                &[],
            )
            .await
            .map_err(|e| query_error("Failed to count rows", e))?;
        Ok(row.get(0))
    }

    async fn latest_update(&mut self, table: &str) -> Result<Option<String>> {
        let row = self
            .client
            .query_one(
                format!(
                    "SELECT MAX({})::text FROM {}",
                    quote_pg_ident("lastUpdate"),
                    quote_pg_ident(table)
                )
                .as_str(),
                &[],
            )
            .await
            .map_err(|e| query_error("Failed to read last update", e))?;
        Ok(row.get(0))
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .client
            .query(
                "SELECT column_name::text, data_type::text, character_maximum_length::int4 \
                 FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name::text = $1::text \
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await
            .map_err(|e| query_error("Failed to read columns", e))?;

        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                name: row.get(0),
                data_type: row.get(1),
                max_length: row.get(2),
            })
            .collect())
    }

    async fn ensure_fundamental_table(&mut self, table: &str) -> Result<()> {
        let mut columns = vec![format!(
            "{} VARCHAR(32) NOT NULL PRIMARY KEY",
            quote_pg_ident("symbol")
        )];
        columns.extend(
            FUNDAMENTAL_FIELDS
                .iter()
                .map(|f| format!("{} {}", quote_pg_ident(f.name), sql_type(f.kind))),
        );
        columns.push(format!("{} TIMESTAMP NOT NULL", quote_pg_ident("lastUpdate")));

        self.client
            .batch_execute(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                quote_pg_ident(table),
                columns.join(", ")
            ))
            .await
            .map_err(|e| query_error("Failed to create table", e))
    }

    async fn upsert_fundamental(&mut self, table: &str, record: &FundamentalRecord) -> Result<()> {
        let quoted = quote_pg_ident(table);

        let mut columns = vec![quote_pg_ident("symbol")];
        columns.extend(FUNDAMENTAL_FIELDS.iter().map(|f| quote_pg_ident(f.name)));
        columns.push(quote_pg_ident("lastUpdate"));
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
        let insert = format!(
            "INSERT INTO {quoted} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut values: Vec<Box<dyn ToSql + Sync + Send>> = vec![Box::new(record.symbol.to_string())];
        for (_, value) in record.values() {
            match value {
                FieldValue::Text(text) => values.push(Box::new(text.map(str::to_string))),
                FieldValue::Number(number) => values.push(Box::new(number)),
            }
        }
        values.push(Box::new(chrono::Utc::now().naive_utc()));
        let params: Vec<&(dyn ToSql + Sync)> = values
            .iter()
            .map(|v| v.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;
        tx.execute(
            format!("DELETE FROM {quoted} WHERE {} = $1", quote_pg_ident("symbol")).as_str(),
            &[&record.symbol.as_str()],
        )
        .await
        .map_err(|e| query_error("Failed to delete previous row", e))?;
        tx.execute(insert.as_str(), &params)
            .await
            .map_err(|e| query_error("Failed to insert row", e))?;
        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit", e))
    }

    async fn ensure_indicator_table(&mut self, table: &str) -> Result<()> {
        self.client
            .batch_execute(&format!(
                "CREATE TABLE IF NOT EXISTS {} (\"date\" DATE NOT NULL PRIMARY KEY, \
                 \"value\" DOUBLE PRECISION NOT NULL, \"lastUpdate\" TIMESTAMP NOT NULL)",
                quote_pg_ident(table)
            ))
            .await
            .map_err(|e| query_error("Failed to create table", e))
    }

    async fn upsert_observations(
        &mut self,
        table: &str,
        observations: &[Observation],
    ) -> Result<usize> {
        let quoted = quote_pg_ident(table);
        let now = chrono::Utc::now().naive_utc();

        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;
        let delete = tx
            .prepare(&format!("DELETE FROM {quoted} WHERE \"date\" = $1"))
            .await
            .map_err(|e| query_error("Failed to prepare delete", e))?;
        let insert = tx
            .prepare(&format!(
                "INSERT INTO {quoted} (\"date\", \"value\", \"lastUpdate\") VALUES ($1, $2, $3)"
            ))
            .await
            .map_err(|e| query_error("Failed to prepare insert", e))?;

        for observation in observations {
            tx.execute(&delete, &[&observation.date])
                .await
                .map_err(|e| query_error("Failed to write observation", e))?;
            tx.execute(&insert, &[&observation.date, &observation.value, &now])
                .await
                .map_err(|e| query_error("Failed to write observation", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit", e))?;
        Ok(observations.len())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let PostgresSession { client, driver } = *self;
        drop(client);
        driver
            .await
            .map_err(|e| FundError::Connectivity(format!("Connection task failed: {e}")))
    }
}
