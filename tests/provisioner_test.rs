//! Integration tests for database provisioning and table introspection

mod common;

use common::{complete_descriptor, FakeConnector};
use fund::adapters::database::{create_connector, SqlBackend, SqlConnector};
use fund::adapters::postgresql::PostgresConnector;
use fund::core::DatabaseProvisioner;
use fund::domain::{DatabaseStatus, FundError, FundamentalRecord, Market, Symbol};

#[tokio::test]
async fn test_create_database_twice_creates_once() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);
    let descriptor = complete_descriptor("ODBC Driver 17 for SQL Server");

    let first = provisioner
        .create_database_if_not_exists(&descriptor)
        .await
        .unwrap();
    let second = provisioner
        .create_database_if_not_exists(&descriptor)
        .await
        .unwrap();

    assert_eq!(first, DatabaseStatus::Created);
    assert_eq!(second, DatabaseStatus::AlreadyExists);

    let state = state.lock().unwrap();
    assert_eq!(state.create_calls, 1);
    // Both runs talk to the administrative database
    assert_eq!(state.connections, vec!["master", "master"]);
    assert_eq!(state.closed, 2);
}

#[tokio::test]
async fn test_create_database_uses_postgres_admin_database() {
    let connector = FakeConnector::new(SqlBackend::PostgreSql);
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);

    provisioner
        .create_database_if_not_exists(&complete_descriptor("PostgreSQL Unicode"))
        .await
        .unwrap();

    assert_eq!(state.lock().unwrap().connections, vec!["postgres"]);
}

#[tokio::test]
async fn test_missing_database_name_never_connects() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);

    let mut descriptor = complete_descriptor("ODBC Driver 17 for SQL Server");
    descriptor.database_name = Some("   ".to_string());

    let err = provisioner
        .create_database_if_not_exists(&descriptor)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = provisioner.list_tables(&descriptor).await.unwrap_err();
    assert!(err.is_validation());

    assert!(state.lock().unwrap().connections.is_empty());
}

#[tokio::test]
async fn test_list_tables_filters_and_sorts() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    connector.add_table("fundamental_data_us", &["symbol"]);
    connector.add_table("customers", &["id"]);
    connector.add_table("fundamental_data_cpi", &["date"]);
    connector.add_table("fundamental_datax", &["id"]);
    let provisioner = DatabaseProvisioner::new(connector);

    let tables = provisioner
        .list_tables(&complete_descriptor("ODBC Driver 17 for SQL Server"))
        .await
        .unwrap();

    assert_eq!(tables, vec!["fundamental_data_cpi", "fundamental_data_us"]);
}

#[tokio::test]
async fn test_list_tables_empty_database() {
    let provisioner = DatabaseProvisioner::new(FakeConnector::new(SqlBackend::SqlServer));
    let tables = provisioner
        .list_tables(&complete_descriptor("ODBC Driver 17 for SQL Server"))
        .await
        .unwrap();
    assert!(tables.is_empty());
}

#[tokio::test]
async fn test_get_table_info_rejects_unmanaged_table() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    connector.add_table("customers", &["id"]);
    let provisioner = DatabaseProvisioner::new(connector);
    let descriptor = complete_descriptor("ODBC Driver 17 for SQL Server");

    for name in ["customers", "fundamental_data_us; DROP TABLE x", "fundamental_data_zz"] {
        let err = provisioner.get_table_info(&descriptor, name).await.unwrap_err();
        assert!(matches!(err, FundError::Validation(_)), "{name}: {err}");
    }
}

#[tokio::test]
async fn test_get_table_info_without_last_update_column() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    connector.add_table("fundamental_data_legacy", &["symbol", "price"]);
    let provisioner = DatabaseProvisioner::new(connector);

    let info = provisioner
        .get_table_info(
            &complete_descriptor("ODBC Driver 17 for SQL Server"),
            "fundamental_data_legacy",
        )
        .await
        .unwrap();

    assert_eq!(info.name, "fundamental_data_legacy");
    assert_eq!(info.row_count, 0);
    assert!(info.last_update.is_none());
    assert_eq!(info.columns.len(), 2);
}

#[tokio::test]
async fn test_get_table_info_counts_stored_rows() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    connector.add_table("fundamental_data_us", &["symbol", "marketCap", "lastUpdate"]);
    {
        let mut state = connector.state.lock().unwrap();
        let table = state.tables.get_mut("fundamental_data_us").unwrap();
        for symbol in ["AAPL", "MSFT"] {
            let record = FundamentalRecord::new(Symbol::new(symbol).unwrap(), Market::Us);
            table.records.insert(symbol.to_string(), record);
        }
    }
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);

    let info = provisioner
        .get_table_info(
            &complete_descriptor("ODBC Driver 17 for SQL Server"),
            "fundamental_data_us",
        )
        .await
        .unwrap();

    assert_eq!(info.row_count, 2);
    assert_eq!(info.last_update.as_deref(), Some("2024-05-01T12:00:00"));
    assert_eq!(info.columns.len(), 3);

    let state = state.lock().unwrap();
    assert_eq!(state.closed, state.connections.len());
}

#[tokio::test]
async fn test_failed_queries_still_close_sessions() {
    let connector = FakeConnector::failing_queries(SqlBackend::SqlServer);
    connector.add_table("fundamental_data_us", &["symbol", "lastUpdate"]);
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);
    let descriptor = complete_descriptor("ODBC Driver 17 for SQL Server");

    let err = provisioner.test_connection(&descriptor).await.unwrap_err();
    assert!(matches!(err, FundError::Query(_)), "{err}");

    let err = provisioner.list_tables(&descriptor).await.unwrap_err();
    assert!(matches!(err, FundError::Query(_)), "{err}");

    let err = provisioner
        .get_table_info(&descriptor, "fundamental_data_us")
        .await
        .unwrap_err();
    assert!(matches!(err, FundError::Query(_)), "{err}");

    let state = state.lock().unwrap();
    assert_eq!(state.connections.len(), 3);
    assert_eq!(state.closed, state.connections.len());
}

#[tokio::test]
async fn test_rejected_table_closes_session() {
    let connector = FakeConnector::new(SqlBackend::SqlServer);
    connector.add_table("customers", &["id"]);
    let state = connector.state.clone();
    let provisioner = DatabaseProvisioner::new(connector);

    let err = provisioner
        .get_table_info(
            &complete_descriptor("ODBC Driver 17 for SQL Server"),
            "customers",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FundError::Validation(_)));

    let state = state.lock().unwrap();
    assert_eq!(state.connections.len(), 1);
    assert_eq!(state.closed, 1);
}

#[tokio::test]
async fn test_connection_failure_is_returned_and_not_raised() {
    let connector = FakeConnector::refusing(SqlBackend::SqlServer);
    let provisioner = DatabaseProvisioner::new(connector);

    let err = provisioner
        .test_connection(&complete_descriptor("ODBC Driver 17 for SQL Server"))
        .await
        .unwrap_err();
    assert!(matches!(err, FundError::Connectivity(_)));
    assert!(err.to_string().contains("localhost"));
}

#[tokio::test]
async fn test_test_connection_returns_version() {
    let provisioner = DatabaseProvisioner::new(FakeConnector::new(SqlBackend::SqlServer));
    let version = provisioner
        .test_connection(&complete_descriptor("ODBC Driver 17 for SQL Server"))
        .await
        .unwrap();
    assert!(version.starts_with("Fake SQL 1.0"));
}

#[tokio::test]
async fn test_unreachable_postgres_server() {
    let provisioner = DatabaseProvisioner::new(PostgresConnector::new());
    let mut descriptor = complete_descriptor("PostgreSQL Unicode");
    descriptor.host = Some("127.0.0.1:1".to_string());

    let err = provisioner.test_connection(&descriptor).await.unwrap_err();
    assert!(matches!(err, FundError::Connectivity(_)), "{err}");
}

#[test]
fn test_factory_selects_backend_from_driver() {
    assert_eq!(
        create_connector("ODBC Driver 18 for SQL Server").backend(),
        SqlBackend::SqlServer
    );
    assert_eq!(
        create_connector("PostgreSQL ANSI").backend(),
        SqlBackend::PostgreSql
    );
}
