//! Shared fixtures for the integration tests
//!
//! [`FakeConnector`] keeps databases and tables in memory and records the
//! calls made against it, so provisioning and storage flows can be tested
//! without a SQL server.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use fund::adapters::database::ident::filter_prefixed;
use fund::adapters::database::{SqlBackend, SqlConnector, SqlSession};
use fund::adapters::provider::{FundamentalProvider, SeriesProvider};
use fund::config::{secret_string, ConnectionDescriptor};
use fund::domain::{
    ColumnInfo, DateRange, FundError, FundamentalRecord, Market, Observation, ProviderError,
    Result, Symbol,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Descriptor with every field a session needs
pub fn complete_descriptor(driver: &str) -> ConnectionDescriptor {
    ConnectionDescriptor {
        host: Some("localhost".to_string()),
        database_name: Some("FundDB".to_string()),
        username: Some("sa".to_string()),
        password: Some(secret_string("YourPassword".to_string())),
        driver_name: driver.to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Debug, Default)]
pub struct FakeTable {
    pub columns: Vec<ColumnInfo>,
    pub records: BTreeMap<String, FundamentalRecord>,
    pub observations: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub databases: BTreeSet<String>,
    pub tables: BTreeMap<String, FakeTable>,
    pub connections: Vec<String>,
    pub create_calls: usize,
    pub closed: usize,
    pub refuse_connections: bool,
    /// Every query on an open session fails while set
    pub fail_queries: bool,
}

/// In-memory [`SqlConnector`]
#[derive(Clone)]
pub struct FakeConnector {
    backend: SqlBackend,
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn new(backend: SqlBackend) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn refusing(backend: SqlBackend) -> Self {
        let connector = Self::new(backend);
        connector.state.lock().unwrap().refuse_connections = true;
        connector
    }

    /// Connector whose sessions open but fail every query
    pub fn failing_queries(backend: SqlBackend) -> Self {
        let connector = Self::new(backend);
        connector.state.lock().unwrap().fail_queries = true;
        connector
    }

    /// Adds a bare table with the given column names
    pub fn add_table(&self, name: &str, columns: &[&str]) {
        let columns = columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.to_string(),
                data_type: "nvarchar".to_string(),
                max_length: Some(255),
            })
            .collect();
        self.state.lock().unwrap().tables.insert(
            name.to_string(),
            FakeTable {
                columns,
                ..Default::default()
            },
        );
    }
}

#[async_trait]
impl SqlConnector for FakeConnector {
    fn backend(&self) -> SqlBackend {
        self.backend
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        database: &str,
    ) -> Result<Box<dyn SqlSession>> {
        let mut state = self.state.lock().unwrap();
        state.connections.push(database.to_string());
        if state.refuse_connections {
            return Err(FundError::Connectivity(format!(
                "connection to {} refused",
                descriptor.host.as_deref().unwrap_or_default()
            )));
        }
        Ok(Box::new(FakeSession {
            state: self.state.clone(),
        }))
    }
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    fn state(&self) -> Result<std::sync::MutexGuard<'_, FakeState>> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(FundError::Query("query failed on fake session".to_string()));
        }
        Ok(state)
    }
}

fn column(name: &str, data_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: data_type.to_string(),
        max_length: None,
    }
}

#[async_trait]
impl SqlSession for FakeSession {
    async fn server_version(&mut self) -> Result<String> {
        self.state()?;
        Ok("Fake SQL 1.0\n  on memory".to_string())
    }

    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.state()?.databases.contains(name))
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        let mut state = self.state()?;
        state.create_calls += 1;
        state.databases.insert(name.to_string());
        Ok(())
    }

    async fn list_tables(&mut self, prefix: &str) -> Result<Vec<String>> {
        let names = self.state()?.tables.keys().cloned().collect();
        Ok(filter_prefixed(names, prefix))
    }

    async fn row_count(&mut self, table: &str) -> Result<i64> {
        let state = self.state()?;
        let t = state
            .tables
            .get(table)
            .ok_or_else(|| FundError::Query(format!("Invalid object name '{table}'")))?;
        Ok((t.records.len() + t.observations.len()) as i64)
    }

    async fn latest_update(&mut self, table: &str) -> Result<Option<String>> {
        let state = self.state()?;
        Ok(state
            .tables
            .get(table)
            .filter(|t| !t.records.is_empty() || !t.observations.is_empty())
            .map(|_| "2024-05-01T12:00:00".to_string()))
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let state = self.state()?;
        Ok(state
            .tables
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn ensure_fundamental_table(&mut self, table: &str) -> Result<()> {
        let mut state = self.state()?;
        state.tables.entry(table.to_string()).or_insert_with(|| FakeTable {
            columns: vec![
                column("symbol", "nvarchar"),
                column("shortName", "nvarchar"),
                column("marketCap", "float"),
                column("lastUpdate", "datetime2"),
            ],
            ..Default::default()
        });
        Ok(())
    }

    async fn upsert_fundamental(&mut self, table: &str, record: &FundamentalRecord) -> Result<()> {
        let mut state = self.state()?;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| FundError::Query(format!("Invalid object name '{table}'")))?;
        t.records
            .insert(record.symbol.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn ensure_indicator_table(&mut self, table: &str) -> Result<()> {
        let mut state = self.state()?;
        state.tables.entry(table.to_string()).or_insert_with(|| FakeTable {
            columns: vec![
                column("date", "date"),
                column("value", "float"),
                column("lastUpdate", "datetime2"),
            ],
            ..Default::default()
        });
        Ok(())
    }

    async fn upsert_observations(
        &mut self,
        table: &str,
        observations: &[Observation],
    ) -> Result<usize> {
        let mut state = self.state()?;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| FundError::Query(format!("Invalid object name '{table}'")))?;
        for o in observations {
            t.observations.insert(o.date, o.value);
        }
        Ok(observations.len())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Fundamentals provider returning a fixed market cap, or failing for
/// symbols listed in `unknown`
pub struct CannedFundamentals {
    pub unknown: Vec<String>,
}

#[async_trait]
impl FundamentalProvider for CannedFundamentals {
    async fn fetch_fundamentals(
        &self,
        symbol: &Symbol,
        market: Market,
    ) -> Result<FundamentalRecord> {
        if self.unknown.iter().any(|u| u == symbol.as_str()) {
            return Err(ProviderError::NoData(symbol.to_string()).into());
        }
        let mut record = FundamentalRecord::new(symbol.clone(), market);
        record.set_text("shortName", format!("{symbol} Corp"));
        record.set_number("marketCap", 1.5e12);
        Ok(record)
    }
}

/// Series provider serving a fixed list of observations
pub struct CannedSeries {
    pub name: &'static str,
    pub observations: Vec<Observation>,
}

#[async_trait]
impl SeriesProvider for CannedSeries {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn latest(&self, series: &str) -> Result<Observation> {
        self.observations
            .iter()
            .max_by_key(|o| o.date)
            .cloned()
            .ok_or_else(|| ProviderError::NoData(series.to_string()).into())
    }

    async fn range(&self, series: &str, range: &DateRange) -> Result<Vec<Observation>> {
        let found: Vec<_> = self
            .observations
            .iter()
            .filter(|o| range.contains(o.date))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(ProviderError::NoData(series.to_string()).into());
        }
        Ok(found)
    }
}
