//! SQL Server client implementation
//!
//! Sessions speak TDS through tiberius over a plain tokio TCP stream. SQL
//! authentication is used and the server certificate is trusted, which is
//! what local and self-signed installations need.

use crate::adapters::database::ident::{filter_prefixed, like_prefix_pattern, quote_mssql_ident};
use crate::adapters::database::traits::{SqlBackend, SqlConnector, SqlSession};
use crate::config::ConnectionDescriptor;
use crate::domain::{
    ColumnInfo, FieldKind, FieldValue, FundError, FundamentalRecord, Observation, Result,
    FUNDAMENTAL_FIELDS,
};
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

type TdsClient = Client<Compat<TcpStream>>;

fn query_error(context: &str, err: tiberius::error::Error) -> FundError {
    FundError::Query(format!("{context}: {err}"))
}

/// Opens SQL Server sessions
#[derive(Debug, Default, Clone)]
pub struct SqlServerConnector;

impl SqlServerConnector {
    pub fn new() -> Self {
        Self
    }

    fn build_config(descriptor: &ConnectionDescriptor, database: &str) -> Result<Config> {
        let (host, port) = descriptor.host_and_port()?;
        let username = descriptor.require_username()?;

        let mut config = Config::new();
        config.host(&host);
        config.port(port.unwrap_or_else(|| SqlBackend::SqlServer.default_port()));
        config.database(database);
        config.authentication(AuthMethod::sql_server(username, descriptor.password_str()));
        config.trust_cert();
        Ok(config)
    }
}

#[async_trait]
impl SqlConnector for SqlServerConnector {
    fn backend(&self) -> SqlBackend {
        SqlBackend::SqlServer
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn SqlSession>> {
        descriptor.validate_for_connect()?;
        let config = Self::build_config(descriptor, database)?;
        let addr = config.get_addr();

        tracing::debug!(addr = %addr, database, "Opening SQL Server session");

        let tcp = TcpStream::connect(&addr)
            .await
            .map_err(|e| FundError::Connectivity(format!("Failed to connect to {addr}: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| FundError::Connectivity(format!("Failed to configure socket: {e}")))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| FundError::Connectivity(format!("Login to {addr} failed: {e}")))?;

        Ok(Box::new(SqlServerSession { client }))
    }
}

/// One open TDS connection
pub struct SqlServerSession {
    client: TdsClient,
}

impl SqlServerSession {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let row = self
            .client
            .query(
                "SELECT 1 FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = @P1",
                &[&table],
            )
            .await
            .map_err(|e| query_error("Failed to look up table", e))?
            .into_row()
            .await
            .map_err(|e| query_error("Failed to look up table", e))?;
        Ok(row.is_some())
    }

    async fn create_table(&mut self, table: &str, columns: &[String]) -> Result<()> {
        if self.table_exists(table).await? {
            return Ok(());
        }

        let ddl = format!(
            "CREATE TABLE {} ({})",
            quote_mssql_ident(table),
            columns.join(", ")
        );
        self.client
            .simple_query(ddl)
            .await
            .map_err(|e| query_error("Failed to create table", e))?
            .into_results()
            .await
            .map_err(|e| query_error("Failed to create table", e))?;

        tracing::info!(table, "Created table");
        Ok(())
    }

    async fn replace_fundamental(&mut self, table: &str, record: &FundamentalRecord) -> Result<()> {
        let quoted = quote_mssql_ident(table);

        self.client
            .execute(
                format!("DELETE FROM {quoted} WHERE [symbol] = @P1"),
                &[&record.symbol.as_str()],
            )
            .await
            .map_err(|e| query_error("Failed to delete previous row", e))?;

        let mut columns = vec![quote_mssql_ident("symbol")];
        columns.extend(FUNDAMENTAL_FIELDS.iter().map(|f| quote_mssql_ident(f.name)));
        columns.push(quote_mssql_ident("lastUpdate"));
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("@P{i}")).collect();

        let mut insert = Query::new(format!(
            "INSERT INTO {quoted} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        ));
        insert.bind(record.symbol.to_string());
        for (_, value) in record.values() {
            match value {
                FieldValue::Text(text) => insert.bind(text.map(str::to_string)),
                FieldValue::Number(number) => insert.bind(number),
            }
        }
        insert.bind(chrono::Utc::now().naive_utc());

        insert
            .execute(&mut self.client)
            .await
            .map_err(|e| query_error("Failed to insert row", e))?;
        Ok(())
    }

    async fn replace_observations(
        &mut self,
        table: &str,
        observations: &[Observation],
    ) -> Result<usize> {
        let quoted = quote_mssql_ident(table);
        let sql = format!(
            "DELETE FROM {quoted} WHERE [date] = @P1; \
             INSERT INTO {quoted} ([date], [value], [lastUpdate]) VALUES (@P1, @P2, @P3)"
        );
        let now = chrono::Utc::now().naive_utc();

        for observation in observations {
            let mut query = Query::new(sql.clone());
            query.bind(observation.date);
            query.bind(observation.value);
            query.bind(now);
            query
                .execute(&mut self.client)
                .await
                .map_err(|e| query_error("Failed to write observation", e))?;
        }
        Ok(observations.len())
    }
}

/// Runs a plain T-SQL batch with no parameters
#[async_trait]
trait Batch: Send {
    async fn batch(&mut self, sql: &str) -> Result<()>;
}

#[async_trait]
impl Batch for SqlServerSession {
    async fn batch(&mut self, sql: &str) -> Result<()> {
        self.client
            .simple_query(sql)
            .await
            .map_err(|e| query_error("Statement failed", e))?
            .into_results()
            .await
            .map_err(|e| query_error("Statement failed", e))?;
        Ok(())
    }
}

/// Commits after successful work, otherwise rolls back and keeps the
/// original error
async fn finish_transaction<B: Batch, T: Send>(session: &mut B, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            session.batch("COMMIT TRANSACTION").await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = session.batch("ROLLBACK TRANSACTION").await {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(e)
        }
    }
}

fn sql_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "NVARCHAR(255)",
        FieldKind::Number => "FLOAT",
    }
}

#[async_trait]
impl SqlSession for SqlServerSession {
    async fn server_version(&mut self) -> Result<String> {
        let row = self
            .client
            .query("SELECT @@VERSION", &[])
            .await
            .map_err(|e| query_error("Version query failed", e))?
            .into_row()
            .await
            .map_err(|e| query_error("Version query failed", e))?;

        Ok(row
            .and_then(|r| r.get::<&str, _>(0).map(str::to_string))
            .unwrap_or_default())
    }

    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let row = self
            .client
            .query("SELECT 1 FROM sys.databases WHERE name = @P1", &[&name])
            .await
            .map_err(|e| query_error("Failed to query sys.databases", e))?
            .into_row()
            .await
            .map_err(|e| query_error("Failed to query sys.databases", e))?;
        Ok(row.is_some())
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        self.client
            .simple_query(format!("CREATE DATABASE {}", quote_mssql_ident(name)))
            .await
            .map_err(|e| query_error("Failed to create database", e))?
            .into_results()
            .await
            .map_err(|e| query_error("Failed to create database", e))?;
        Ok(())
    }

    async fn list_tables(&mut self, prefix: &str) -> Result<Vec<String>> {
        let pattern = like_prefix_pattern(prefix);
        let rows = self
            .client
            .query(
                "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_NAME LIKE @P1 ESCAPE '\\'",
                &[&pattern.as_str()],
            )
            .await
            .map_err(|e| query_error("Failed to list tables", e))?
            .into_first_result()
            .await
            .map_err(|e| query_error("Failed to list tables", e))?;

        let names = rows
            .iter()
            .filter_map(|row| row.get::<&str, _>(0).map(str::to_string))
            .collect();
        Ok(filter_prefixed(names, prefix))
    }

    async fn row_count(&mut self, table: &str) -> Result<i64> {
        let row = self
            .client
            .simple_query(format!("SELECT COUNT_BIG(*) FROM {}", quote_mssql_ident(table)))
            .await
            .map_err(|e| query_error("Failed to count rows", e))?
            .into_row()
            .await
            .map_err(|e| query_error("Failed to count rows", e))?;

        Ok(row.and_then(|r| r.get::<i64, _>(0)).unwrap_or(0))
    }

    async fn latest_update(&mut self, table: &str) -> Result<Option<String>> {
        let row = self
            .client
            .simple_query(format!(
                "SELECT CONVERT(NVARCHAR(33), MAX([lastUpdate]), 126) FROM {}",
                quote_mssql_ident(table)
            ))
            .await
            .map_err(|e| query_error("Failed to read last update", e))?
            .into_row()
            .await
            .map_err(|e| query_error("Failed to read last update", e))?;

        Ok(row.and_then(|r| r.get::<&str, _>(0).map(str::to_string)))
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .client
            .query(
                "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH \
                 FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = @P1 \
                 ORDER BY ORDINAL_POSITION",
                &[&table],
            )
            .await
            .map_err(|e| query_error("Failed to read columns", e))?
            .into_first_result()
            .await
            .map_err(|e| query_error("Failed to read columns", e))?;

        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                name: row.get::<&str, _>(0).unwrap_or_default().to_string(),
                data_type: row.get::<&str, _>(1).unwrap_or_default().to_string(),
                max_length: row.get::<i32, _>(2),
            })
            .collect())
    }

    async fn ensure_fundamental_table(&mut self, table: &str) -> Result<()> {
        let mut columns = vec![format!(
            "{} NVARCHAR(32) NOT NULL PRIMARY KEY",
            quote_mssql_ident("symbol")
        )];
        columns.extend(
            FUNDAMENTAL_FIELDS
                .iter()
                .map(|f| format!("{} {} NULL", quote_mssql_ident(f.name), sql_type(f.kind))),
        );
        columns.push(format!("{} DATETIME2 NOT NULL", quote_mssql_ident("lastUpdate")));
        self.create_table(table, &columns).await
    }

    async fn upsert_fundamental(&mut self, table: &str, record: &FundamentalRecord) -> Result<()> {
        self.batch("BEGIN TRANSACTION").await?;
        let outcome = self.replace_fundamental(table, record).await;
        finish_transaction(self, outcome).await
    }

    async fn ensure_indicator_table(&mut self, table: &str) -> Result<()> {
        let columns = vec![
            format!("{} DATE NOT NULL PRIMARY KEY", quote_mssql_ident("date")),
            format!("{} FLOAT NOT NULL", quote_mssql_ident("value")),
            format!("{} DATETIME2 NOT NULL", quote_mssql_ident("lastUpdate")),
        ];
        self.create_table(table, &columns).await
    }

    async fn upsert_observations(
        &mut self,
        table: &str,
        observations: &[Observation],
    ) -> Result<usize> {
        self.batch("BEGIN TRANSACTION").await?;
        let outcome = self.replace_observations(table, observations).await;
        finish_transaction(self, outcome).await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let session = *self;
        session
            .client
            .close()
            .await
            .map_err(|e| FundError::Connectivity(format!("Failed to close session: {e}")))
    }
}
