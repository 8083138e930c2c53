//! Normalized fundamental data for one instrument
//!
//! Providers return wildly different payloads; [`FundamentalRecord`] keeps
//! only the fixed set of fields listed in [`FUNDAMENTAL_FIELDS`]. The same
//! list drives table creation and inserts, so the stored columns always
//! match what the record can hold.

use super::market::{Market, Symbol};
use std::collections::HashMap;

/// Storage type of a fundamental field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// Name and type of one fundamental field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
    }
}

const fn number(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Number,
    }
}

/// Every field a record can carry, in column order
pub const FUNDAMENTAL_FIELDS: &[FieldSpec] = &[
    text("shortName"),
    text("industry"),
    text("sector"),
    text("country"),
    text("exchange"),
    text("currency"),
    number("marketCap"),
    number("trailingPE"),
    number("forwardPE"),
    number("priceToBook"),
    number("priceToSales"),
    number("pegRatio"),
    number("debtToEquity"),
    number("currentRatio"),
    number("quickRatio"),
    number("totalCash"),
    number("totalDebt"),
    number("returnOnEquity"),
    number("returnOnAssets"),
    number("profitMargins"),
    number("operatingMargins"),
    number("grossMargins"),
    number("revenueGrowth"),
    number("earningsGrowth"),
    number("totalRevenue"),
    number("dividendYield"),
    number("dividendRate"),
    number("payoutRatio"),
    text("exDividendDate"),
    number("beta"),
    number("bookValue"),
    number("fiftyTwoWeekHigh"),
    number("fiftyTwoWeekLow"),
    number("averageVolume"),
];

/// Looks up a field by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FUNDAMENTAL_FIELDS.iter().find(|f| f.name == name)
}

/// Value of one field as bound into a statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
}

/// Fundamentals of one instrument
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalRecord {
    pub symbol: Symbol,
    pub market: Market,
    /// Symbol as spelled for the provider (`2330.TW`)
    pub provider_symbol: String,
    texts: HashMap<&'static str, String>,
    numbers: HashMap<&'static str, f64>,
}

impl FundamentalRecord {
    /// Creates an empty record
    pub fn new(symbol: Symbol, market: Market) -> Self {
        let provider_symbol = market.provider_symbol(&symbol);
        Self {
            symbol,
            market,
            provider_symbol,
            texts: HashMap::new(),
            numbers: HashMap::new(),
        }
    }

    /// Sets a text field; unknown or numeric field names are ignored
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        if let Some(spec) = field_spec(name).filter(|f| f.kind == FieldKind::Text) {
            let value = value.into();
            if !value.trim().is_empty() {
                self.texts.insert(spec.name, value);
            }
        }
    }

    /// Sets a numeric field; unknown or text field names and non-finite values are ignored
    pub fn set_number(&mut self, name: &str, value: f64) {
        if let Some(spec) = field_spec(name).filter(|f| f.kind == FieldKind::Number) {
            if value.is_finite() {
                self.numbers.insert(spec.name, value);
            }
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.numbers.get(name).copied()
    }

    /// True when the provider returned nothing usable
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.numbers.is_empty()
    }

    /// Every field in column order, with absent values as `None`
    pub fn values(&self) -> impl Iterator<Item = (&'static FieldSpec, FieldValue<'_>)> + '_ {
        FUNDAMENTAL_FIELDS.iter().map(move |spec| {
            let value = match spec.kind {
                FieldKind::Text => FieldValue::Text(self.text(spec.name)),
                FieldKind::Number => FieldValue::Number(self.number(spec.name)),
            };
            (spec, value)
        })
    }
}
