//! Configuration management for fund.
//!
//! Settings live in a single JSON document, `config.json`, in the working
//! directory:
//!
//! ```json
//! {
//!   "db_server": "localhost",
//!   "db_name": "FundDB",
//!   "db_user": "sa",
//!   "db_password": "YourPassword",
//!   "db_driver": "ODBC Driver 17 for SQL Server",
//!   "fred_api_key": "your_fred_api_key_here"
//! }
//! ```
//!
//! Unset values are omitted from the file. `db_driver` falls back to
//! `ODBC Driver 17 for SQL Server` when absent; a driver name mentioning
//! PostgreSQL switches the SQL backend.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fund::config::{ConfigService, ConfigStore, DatabaseUpdate};
//!
//! # fn example() -> fund::domain::Result<()> {
//! let mut store = ConfigStore::load_default();
//! let mut service = ConfigService::new(&mut store);
//!
//! service.update_database_config(DatabaseUpdate {
//!     host: Some("localhost".to_string()),
//!     database_name: Some("FundDB".to_string()),
//!     ..Default::default()
//! })?;
//!
//! for (field, value) in service.show_database_config().entries() {
//!     println!("{field}: {value}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! - [`ConfigStore`] - load/save and mutation of the document
//! - [`ConfigService`] - masked views and confirmation messages
//! - [`secret`] - secret wrappers and masking rules

pub mod schema;
pub mod secret;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use schema::{ConnectionDescriptor, DatabaseUpdate, LoggingConfig, PersistedConfig, DEFAULT_DRIVER};
pub use secret::{
    mask_api_key, mask_password, secret_string, secret_string_opt, SecretString, SecretValue,
    NOT_CONFIGURED, SECRET_MASK,
};
pub use service::{ApiKeyStatus, ApiKeyView, ConfigService, DatabaseConfigView};
pub use store::{ConfigStore, DEFAULT_CONFIG_FILE};
