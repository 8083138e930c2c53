//! Database abstraction layer
//!
//! This module provides a trait-based abstraction over the SQL servers fund
//! can provision and write to (SQL Server, PostgreSQL).

pub mod factory;
pub mod ident;
pub mod traits;

pub use factory::create_connector;
pub use traits::{close_session, SqlBackend, SqlConnector, SqlSession};
