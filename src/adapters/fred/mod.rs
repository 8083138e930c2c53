//! FRED (Federal Reserve Economic Data) integration
//!
//! Supplies the CPI, non-farm payroll and WTI crude series.

pub mod client;
pub mod models;

pub use client::{FredClient, FRED_BASE_URL};
