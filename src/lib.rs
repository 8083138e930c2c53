// fund - Market Fundamentals to SQL Database Tool
// Copyright (c) 2025 fund Contributors
// Licensed under the MIT License

//! # fund - market fundamentals into SQL databases
//!
//! fund is a command-line tool that fetches company fundamentals and
//! economic indicators from public providers and stores them in a SQL
//! Server or PostgreSQL database.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Configuring** the connection and the FRED API key in `config.json`
//! - **Provisioning** the database and inspecting the tables fund writes
//! - **Fetching** fundamentals from Yahoo Finance and series from FRED
//! - **Storing** one row per symbol, or one row per observation date
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Provisioning and fetch-and-store orchestration
//! - [`adapters`] - External integrations (SQL Server, PostgreSQL, Yahoo, FRED)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fund::adapters::database::create_connector;
//! use fund::config::ConfigStore;
//! use fund::core::DatabaseProvisioner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ConfigStore::load("config.json");
//!     let descriptor = store.connection_descriptor();
//!
//!     let provisioner = DatabaseProvisioner::new(create_connector(&descriptor.driver_name));
//!     let status = provisioner.create_database_if_not_exists(&descriptor).await?;
//!     println!("{status:?}");
//!
//!     for table in provisioner.list_tables(&descriptor).await? {
//!         println!("{table}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], carrying a
//! [`domain::FundError`]. The CLI maps error kinds to exit codes:
//! `2` for configuration and validation problems, `4` for database and
//! provider failures, `5` for anything else.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
