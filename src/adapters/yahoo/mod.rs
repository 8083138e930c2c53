//! Yahoo Finance integration
//!
//! Supplies per-symbol fundamentals (`quoteSummary`) for every market and
//! daily futures closes (`chart`) for the gold indicator.

pub mod client;
pub mod models;

pub use client::{YahooFinanceClient, YAHOO_API_URL, YAHOO_COOKIE_URL};
