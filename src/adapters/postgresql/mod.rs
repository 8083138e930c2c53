//! PostgreSQL database integration
//!
//! This module provides the [`PostgresConnector`], selected when the
//! configured driver name mentions PostgreSQL.

pub mod client;

pub use client::{PostgresConnector, PostgresSession};
