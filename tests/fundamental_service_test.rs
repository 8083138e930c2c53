//! Integration tests for fetching and storing fundamentals and indicators

mod common;

use common::{complete_descriptor, date, CannedFundamentals, CannedSeries, FakeConnector};
use fund::adapters::database::SqlBackend;
use fund::adapters::provider::SeriesProvider;
use fund::core::FundamentalDataService;
use fund::domain::{DateRange, EconomicIndicator, FundError, Market, Observation, Symbol};
use std::sync::Arc;

fn observation(y: i32, m: u32, d: u32, value: f64) -> Observation {
    Observation {
        date: date(y, m, d),
        value,
    }
}

fn service(connector: FakeConnector) -> FundamentalDataService<FakeConnector> {
    FundamentalDataService::new(
        connector,
        complete_descriptor("ODBC Driver 17 for SQL Server"),
        Arc::new(CannedFundamentals {
            unknown: vec!["NOPE".to_string()],
        }),
        Arc::new(CannedSeries {
            name: "Yahoo Finance",
            observations: vec![observation(2024, 5, 2, 2310.5), observation(2024, 5, 3, 2301.0)],
        }),
    )
}

fn fred() -> Arc<dyn SeriesProvider> {
    Arc::new(CannedSeries {
        name: "FRED",
        observations: vec![
            observation(2024, 1, 1, 308.4),
            observation(2024, 2, 1, 310.3),
            observation(2024, 3, 1, 312.2),
        ],
    })
}

#[tokio::test]
async fn test_fetch_and_store_replaces_symbol_row() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let service = service(connector);
    let symbol = Symbol::new("2330").unwrap();

    let record = service.fetch_and_store(&symbol, Market::Tw).await.unwrap();
    assert_eq!(record.text("shortName"), Some("2330 Corp"));
    service.fetch_and_store(&symbol, Market::Tw).await.unwrap();

    let state = state.lock().unwrap();
    let table = state.tables.get("fundamental_data_tw").unwrap();
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records["2330"].number("marketCap"), Some(1.5e12));
    assert_eq!(state.closed, 2);
}

#[tokio::test]
async fn test_provider_failure_leaves_database_untouched() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let service = service(connector);

    let err = service
        .fetch_and_store(&Symbol::new("NOPE").unwrap(), Market::Us)
        .await
        .unwrap_err();
    assert!(matches!(err, FundError::Provider(_)));

    let state = state.lock().unwrap();
    assert!(state.connections.is_empty());
    assert!(state.tables.is_empty());
}

#[tokio::test]
async fn test_incomplete_descriptor_is_rejected_before_fetching() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let mut descriptor = complete_descriptor("ODBC Driver 17 for SQL Server");
    descriptor.username = None;

    let service = FundamentalDataService::new(
        connector,
        descriptor,
        Arc::new(CannedFundamentals { unknown: vec![] }),
        fred(),
    );

    let err = service
        .fetch_and_store(&Symbol::new("AAPL").unwrap(), Market::Us)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(state.lock().unwrap().connections.is_empty());
}

#[tokio::test]
async fn test_fred_indicator_requires_api_key() {
    let service = service(FakeConnector::new(SqlBackend::SqlServer));

    let err = service
        .fetch_and_store_indicator(EconomicIndicator::Cpi, None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("FRED API key"));
}

#[tokio::test]
async fn test_gold_uses_futures_provider_without_api_key() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let service = service(connector);

    let stored = service
        .fetch_and_store_indicator(EconomicIndicator::Gold, None)
        .await
        .unwrap();
    assert_eq!(stored, vec![observation(2024, 5, 3, 2301.0)]);

    let state = state.lock().unwrap();
    let table = state.tables.get("fundamental_data_gold").unwrap();
    assert_eq!(table.observations.len(), 1);
}

#[tokio::test]
async fn test_indicator_range_upserts_per_date() {
    let connector = FakeConnector::new(SqlBackend::PostgreSql);
    let state = connector.state.clone();
    let service = service(connector).with_fred(fred());

    let range = DateRange::parse("2024/02/01", "2024/03/31").unwrap();
    let stored = service
        .fetch_and_store_indicator(EconomicIndicator::Cpi, Some(range))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);

    // Overlapping run replaces existing dates instead of duplicating them
    let range = DateRange::parse("2024/01/01", "2024/02/29").unwrap();
    service
        .fetch_and_store_indicator(EconomicIndicator::Cpi, Some(range))
        .await
        .unwrap();

    let state = state.lock().unwrap();
    let table = state.tables.get("fundamental_data_cpi").unwrap();
    assert_eq!(table.observations.len(), 3);
    assert_eq!(table.observations[&date(2024, 3, 1)], 312.2);
}

#[tokio::test]
async fn test_indicator_range_without_data() {
    let service = service(FakeConnector::new(SqlBackend::SqlServer)).with_fred(fred());

    let range = DateRange::parse("2020/01/01", "2020/12/31").unwrap();
    let err = service
        .fetch_and_store_indicator(EconomicIndicator::Nfp, Some(range))
        .await
        .unwrap_err();
    assert!(matches!(err, FundError::Provider(_)));
}
