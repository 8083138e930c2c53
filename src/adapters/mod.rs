//! External system integrations for fund.
//!
//! This module provides adapters for the systems fund talks to:
//!
//! - [`database`] - SQL abstraction layer (trait-based) and connector factory
//! - [`sqlserver`] - Microsoft SQL Server implementation (TDS)
//! - [`postgresql`] - PostgreSQL implementation
//! - [`yahoo`] - Yahoo Finance fundamentals and futures prices
//! - [`fred`] - FRED macroeconomic series
//! - [`provider`] - provider traits consumed by the storage service
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with fake implementations. Driver and HTTP errors are
//! converted into [`crate::domain::FundError`] at this boundary.
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
//! let version = provisioner.test_connection(&descriptor).await?;
//! println!("{version}");
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod fred;
pub mod postgresql;
pub mod provider;
pub mod sqlserver;
pub mod yahoo;
