//! Market-data provider traits
//!
//! The storage service only sees these traits, so tests can swap the HTTP
//! clients for canned data.

use crate::domain::{DateRange, FundamentalRecord, Market, Observation, Result, Symbol};
use async_trait::async_trait;

/// Source of per-instrument fundamentals
#[async_trait]
pub trait FundamentalProvider: Send + Sync {
    /// Fetches the fundamentals of `symbol` quoted on `market`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::FundError::Provider`] when the provider is
    /// unreachable, rejects the request or knows nothing about the symbol.
    async fn fetch_fundamentals(&self, symbol: &Symbol, market: Market)
        -> Result<FundamentalRecord>;
}

/// Source of dated observations for a named series
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Provider name for messages
    fn name(&self) -> &'static str;

    /// Most recent observation of `series`
    async fn latest(&self, series: &str) -> Result<Observation>;

    /// Observations of `series` within `range`, oldest first
    async fn range(&self, series: &str, range: &DateRange) -> Result<Vec<Observation>>;
}
