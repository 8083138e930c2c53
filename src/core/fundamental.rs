//! Fetch-and-store orchestration
//!
//! [`FundamentalDataService`] backs the `fund add` command. It pulls data
//! from a provider, makes sure the destination table exists and replaces
//! the affected rows:
//!
//! - fundamentals are keyed by symbol in `fundamental_data_<market>`
//! - indicator observations are keyed by date in `fundamental_data_<indicator>`

use crate::adapters::database::traits::{close_session, SqlConnector};
use crate::adapters::provider::{FundamentalProvider, SeriesProvider};
use crate::config::ConnectionDescriptor;
use crate::domain::{
    DateRange, EconomicIndicator, FundError, FundamentalRecord, Market, Observation, Result,
    SeriesSource, Symbol,
};
use std::sync::Arc;

/// Fetches market data and writes it to the configured database
pub struct FundamentalDataService<C> {
    connector: C,
    descriptor: ConnectionDescriptor,
    fundamentals: Arc<dyn FundamentalProvider>,
    futures: Arc<dyn SeriesProvider>,
    fred: Option<Arc<dyn SeriesProvider>>,
}

impl<C: SqlConnector> FundamentalDataService<C> {
    /// Create a service without FRED access
    ///
    /// # Arguments
    ///
    /// * `connector` - Opens database sessions
    /// * `descriptor` - Where to store the data
    /// * `fundamentals` - Source of per-symbol fundamentals
    /// * `futures` - Source of futures closes (gold)
    pub fn new(
        connector: C,
        descriptor: ConnectionDescriptor,
        fundamentals: Arc<dyn FundamentalProvider>,
        futures: Arc<dyn SeriesProvider>,
    ) -> Self {
        Self {
            connector,
            descriptor,
            fundamentals,
            futures,
            fred: None,
        }
    }

    /// Enables the FRED-backed indicators
    pub fn with_fred(mut self, fred: Arc<dyn SeriesProvider>) -> Self {
        self.fred = Some(fred);
        self
    }

    fn check_descriptor(&self) -> Result<&str> {
        let database = self.descriptor.require_database_name()?;
        self.descriptor.validate_for_connect()?;
        Ok(database)
    }

    /// Fetches the fundamentals of `symbol` and stores them
    ///
    /// # Errors
    ///
    /// Returns a validation error when the database settings are incomplete,
    /// a provider error when the fetch fails, and a query or connectivity
    /// error when the write fails.
    pub async fn fetch_and_store(&self, symbol: &Symbol, market: Market) -> Result<FundamentalRecord> {
        let database = self.check_descriptor()?;

        let record = self.fundamentals.fetch_fundamentals(symbol, market).await?;
        let table = market.table_name();

        let mut session = self.connector.connect(&self.descriptor, database).await?;
        let result: Result<()> = async {
            session.ensure_fundamental_table(&table).await?;
            session.upsert_fundamental(&table, &record).await
        }
        .await;
        close_session(session).await;
        result?;

        tracing::info!(symbol = %symbol, market = %market, table = %table, "Stored fundamentals");
        Ok(record)
    }

    /// Fetches an indicator's latest observation, or every observation in
    /// `range`, and stores them
    pub async fn fetch_and_store_indicator(
        &self,
        indicator: EconomicIndicator,
        range: Option<DateRange>,
    ) -> Result<Vec<Observation>> {
        let (provider, series) = match indicator.source() {
            SeriesSource::Fred(series) => {
                let provider = self.fred.as_ref().ok_or_else(|| {
                    FundError::Validation(
                        "FRED API key is not configured; set it with `fund fred --fred <KEY>`"
                            .to_string(),
                    )
                })?;
                (provider, series)
            }
            SeriesSource::YahooChart(symbol) => (&self.futures, symbol),
        };
        let database = self.check_descriptor()?;

        tracing::debug!(
            indicator = indicator.code(),
            provider = provider.name(),
            series,
            "Fetching indicator"
        );
        let observations = match &range {
            Some(range) => provider.range(series, range).await?,
            None => vec![provider.latest(series).await?],
        };

        let table = indicator.table_name();
        let mut session = self.connector.connect(&self.descriptor, database).await?;
        let result: Result<usize> = async {
            session.ensure_indicator_table(&table).await?;
            session.upsert_observations(&table, &observations).await
        }
        .await;
        close_session(session).await;
        let written = result?;

        tracing::info!(indicator = indicator.code(), table = %table, written, "Stored observations");
        Ok(observations)
    }
}
