//! FRED API payloads

use crate::domain::Observation;
use chrono::NaiveDate;
use serde::Deserialize;

/// FRED's marker for a missing value
pub const MISSING_VALUE: &str = ".";

/// Body of `series/observations`
#[derive(Debug, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}

/// One observation as FRED sends it, both fields as strings
#[derive(Debug, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

impl RawObservation {
    /// Converts to an [`Observation`], `None` for missing or malformed values
    pub fn parse(&self) -> Option<Observation> {
        let value = self.value.trim();
        if value == MISSING_VALUE {
            return None;
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let value = value.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Observation { date, value })
    }
}

/// Error body FRED returns with 4xx statuses
#[derive(Debug, Deserialize)]
pub struct FredErrorBody {
    #[serde(default)]
    pub error_code: Option<u16>,
    #[serde(default)]
    pub error_message: Option<String>,
}
