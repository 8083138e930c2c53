//! Microsoft SQL Server integration
//!
//! This module provides the TDS-based [`SqlServerConnector`] used for the
//! default `ODBC Driver 17 for SQL Server` configuration.

pub mod client;

pub use client::{SqlServerConnector, SqlServerSession};
