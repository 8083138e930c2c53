//! Macroeconomic indicators and their observations

use super::errors::FundError;
use super::market::TABLE_PREFIX;
use super::result::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an indicator's series comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    /// FRED series id
    Fred(&'static str),
    /// Yahoo Finance chart symbol
    YahooChart(&'static str),
}

/// Supported economic indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EconomicIndicator {
    /// US consumer price index, all urban consumers
    Cpi,
    /// US non-farm payrolls
    Nfp,
    /// WTI crude oil spot price
    Oil,
    /// COMEX gold futures
    Gold,
}

impl EconomicIndicator {
    /// Short lowercase code
    pub fn code(&self) -> &'static str {
        match self {
            EconomicIndicator::Cpi => "cpi",
            EconomicIndicator::Nfp => "nfp",
            EconomicIndicator::Oil => "oil",
            EconomicIndicator::Gold => "gold",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            EconomicIndicator::Cpi => "US CPI",
            EconomicIndicator::Nfp => "US NFP",
            EconomicIndicator::Oil => "WTI crude oil price",
            EconomicIndicator::Gold => "Gold futures price",
        }
    }

    /// Unit the values are expressed in
    pub fn unit(&self) -> &'static str {
        match self {
            EconomicIndicator::Cpi => "index",
            EconomicIndicator::Nfp => "thousands",
            EconomicIndicator::Oil | EconomicIndicator::Gold => "USD",
        }
    }

    pub fn source(&self) -> SeriesSource {
        match self {
            EconomicIndicator::Cpi => SeriesSource::Fred("CPIAUCSL"),
            EconomicIndicator::Nfp => SeriesSource::Fred("PAYEMS"),
            EconomicIndicator::Oil => SeriesSource::Fred("DCOILWTICO"),
            EconomicIndicator::Gold => SeriesSource::YahooChart("GC=F"),
        }
    }

    /// Table holding this indicator's observations
    pub fn table_name(&self) -> String {
        format!("{TABLE_PREFIX}{}", self.code())
    }
}

impl fmt::Display for EconomicIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One dated value of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FundError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses both ends from `yyyy/mm/dd` or `yyyy-mm-dd`
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parses `yyyy/mm/dd` or `yyyy-mm-dd`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| {
            FundError::Validation(format!(
                "invalid date '{input}', expected yyyy/mm/dd or yyyy-mm-dd"
            ))
        })
}
