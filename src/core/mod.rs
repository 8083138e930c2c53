//! Core business logic for fund.
//!
//! # Modules
//!
//! - [`provision`] - Connection checks, database creation and table introspection
//! - [`fundamental`] - Fetching provider data and writing it to the database
//!
//! # Workflow
//!
//! The typical `fund add` workflow:
//!
//! 1. **Validate**: Check the stored connection settings
//! 2. **Fetch**: Ask Yahoo Finance or FRED for the data
//! 3. **Ensure Table**: Create `fundamental_data_<market|indicator>` if missing
//! 4. **Upsert**: Replace the rows for the fetched symbol or dates
//!
//! # Example
//!
//! ```rust,no_run
//! use fund::adapters::database::create_connector;
//! use fund::config::ConfigStore;
//! use fund::core::DatabaseProvisioner;
//!
//! # async fn example() -> fund::domain::Result<()> {
//! let store = ConfigStore::load_default();
//! let descriptor = store.connection_descriptor();
//! let provisioner = DatabaseProvisioner::new(create_connector(&descriptor.driver_name));
//!
//! let status = provisioner.create_database_if_not_exists(&descriptor).await?;
//! println!("{}", status.message(descriptor.require_database_name()?));
//!
//! for table in provisioner.list_tables(&descriptor).await? {
//!     println!("{table}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod fundamental;
pub mod provision;

pub use fundamental::FundamentalDataService;
pub use provision::DatabaseProvisioner;
