//! Domain models and types for fund.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Market identifiers** ([`Market`], [`Symbol`])
//! - **Data records** ([`FundamentalRecord`], [`Observation`])
//! - **Economic indicators** ([`EconomicIndicator`], [`DateRange`])
//! - **Catalog types** ([`DatabaseStatus`], [`TableInfo`], [`ColumnInfo`])
//! - **Error types** ([`FundError`], [`ProviderError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FundError>`]. Operations that
//! talk to a database or a provider never panic on remote failures; the
//! failure is returned as a value and rendered by the CLI.
//!
//! ```rust
//! use fund::domain::{FundError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(FundError::Validation("database name is not configured".to_string()))
//! }
//! ```

pub mod catalog;
pub mod errors;
pub mod fundamental;
pub mod indicator;
pub mod market;
pub mod result;

// Re-export commonly used types for convenience
pub use catalog::{ColumnInfo, DatabaseStatus, TableInfo};
pub use errors::{FundError, ProviderError};
pub use fundamental::{
    field_spec, FieldKind, FieldSpec, FieldValue, FundamentalRecord, FUNDAMENTAL_FIELDS,
};
pub use indicator::{parse_date, DateRange, EconomicIndicator, Observation, SeriesSource};
pub use market::{Market, Symbol, TABLE_PREFIX};
pub use result::Result;
