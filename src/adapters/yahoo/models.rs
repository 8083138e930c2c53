//! Yahoo Finance payloads and field mapping
//!
//! `quoteSummary` modules are kept as loose JSON: values come either as bare
//! scalars or as `{"raw": .., "fmt": ..}` objects, and the set of keys varies
//! by instrument type.

use crate::domain::{field_spec, FieldKind, FundamentalRecord, Market, Observation, Symbol};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

/// `quoteSummary` modules requested for every symbol
pub const QUOTE_SUMMARY_MODULES: &[&str] = &[
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "assetProfile",
];

/// Where each record field is read from, as `(module, key)` candidates in
/// order of preference
const FIELD_SOURCES: &[(&str, &[(&str, &str)])] = &[
    ("shortName", &[("price", "shortName"), ("price", "longName")]),
    ("industry", &[("assetProfile", "industry")]),
    ("sector", &[("assetProfile", "sector")]),
    ("country", &[("assetProfile", "country")]),
    ("exchange", &[("price", "exchangeName"), ("price", "exchange")]),
    ("currency", &[("price", "currency"), ("summaryDetail", "currency")]),
    ("marketCap", &[("price", "marketCap"), ("summaryDetail", "marketCap")]),
    ("trailingPE", &[("summaryDetail", "trailingPE")]),
    (
        "forwardPE",
        &[("summaryDetail", "forwardPE"), ("defaultKeyStatistics", "forwardPE")],
    ),
    ("priceToBook", &[("defaultKeyStatistics", "priceToBook")]),
    ("priceToSales", &[("summaryDetail", "priceToSalesTrailing12Months")]),
    ("pegRatio", &[("defaultKeyStatistics", "pegRatio")]),
    ("debtToEquity", &[("financialData", "debtToEquity")]),
    ("currentRatio", &[("financialData", "currentRatio")]),
    ("quickRatio", &[("financialData", "quickRatio")]),
    ("totalCash", &[("financialData", "totalCash")]),
    ("totalDebt", &[("financialData", "totalDebt")]),
    ("returnOnEquity", &[("financialData", "returnOnEquity")]),
    ("returnOnAssets", &[("financialData", "returnOnAssets")]),
    (
        "profitMargins",
        &[("financialData", "profitMargins"), ("defaultKeyStatistics", "profitMargins")],
    ),
    ("operatingMargins", &[("financialData", "operatingMargins")]),
    ("grossMargins", &[("financialData", "grossMargins")]),
    ("revenueGrowth", &[("financialData", "revenueGrowth")]),
    ("earningsGrowth", &[("financialData", "earningsGrowth")]),
    ("totalRevenue", &[("financialData", "totalRevenue")]),
    ("dividendYield", &[("summaryDetail", "dividendYield")]),
    ("dividendRate", &[("summaryDetail", "dividendRate")]),
    ("payoutRatio", &[("summaryDetail", "payoutRatio")]),
    ("exDividendDate", &[("summaryDetail", "exDividendDate")]),
    ("beta", &[("summaryDetail", "beta"), ("defaultKeyStatistics", "beta")]),
    ("bookValue", &[("defaultKeyStatistics", "bookValue")]),
    ("fiftyTwoWeekHigh", &[("summaryDetail", "fiftyTwoWeekHigh")]),
    ("fiftyTwoWeekLow", &[("summaryDetail", "fiftyTwoWeekLow")]),
    (
        "averageVolume",
        &[("summaryDetail", "averageVolume"), ("price", "averageDailyVolume3Month")],
    ),
];

/// Error object Yahoo embeds in otherwise successful responses
#[derive(Debug, Clone, Deserialize)]
pub struct YahooErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `v10/finance/quoteSummary`
#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub error: Option<YahooErrorBody>,
}

/// Numeric value of a module entry, unwrapping `{"raw": ..}`
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => obj.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}

/// Text value of a module entry
///
/// `exDividendDate` arrives as an epoch; it is rendered as `yyyy-mm-dd`.
fn text_of(field: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) if field == "exDividendDate" => obj
            .get("raw")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive().to_string())
            .or_else(|| obj.get("fmt").and_then(Value::as_str).map(str::to_string)),
        Value::Object(obj) => obj.get("fmt").and_then(Value::as_str).map(str::to_string),
        Value::Number(n) if field == "exDividendDate" => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive().to_string()),
        _ => None,
    }
}

/// Builds a record from one `quoteSummary` result
pub fn record_from_modules(
    symbol: &Symbol,
    market: Market,
    modules: &Map<String, Value>,
) -> FundamentalRecord {
    let mut record = FundamentalRecord::new(symbol.clone(), market);

    for (field, sources) in FIELD_SOURCES {
        let text_field = is_text_field(field);
        let candidates = sources
            .iter()
            .filter_map(|(module, key)| modules.get(*module)?.get(*key));

        for value in candidates {
            if text_field {
                if let Some(text) = text_of(field, value) {
                    record.set_text(field, text);
                }
                if record.text(field).is_some() {
                    break;
                }
            } else {
                if let Some(number) = number_of(value) {
                    record.set_number(field, number);
                }
                if record.number(field).is_some() {
                    break;
                }
            }
        }
    }

    record
}

fn is_text_field(field: &str) -> bool {
    field_spec(field).is_some_and(|f| f.kind == FieldKind::Text)
}

/// Body of `v8/finance/chart`
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<YahooErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Daily closes, oldest first, skipping empty bars
    ///
    /// Dates are taken in UTC; when two bars land on the same date the later
    /// one wins.
    pub fn daily_closes(&self) -> Vec<Observation> {
        let closes = self
            .indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or_default();

        let mut observations: Vec<Observation> = Vec::with_capacity(closes.len());
        for (ts, close) in self.timestamp.iter().zip(closes) {
            let (Some(dt), Some(value)) = (DateTime::from_timestamp(*ts, 0), close) else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            let date = dt.date_naive();
            match observations.last_mut() {
                Some(last) if last.date == date => last.value = *value,
                _ => observations.push(Observation {
                    date,
                    value: *value,
                }),
            }
        }
        observations
    }
}
