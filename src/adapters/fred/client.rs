//! FRED HTTP client
//!
//! Reads series observations from the Federal Reserve Bank of St. Louis
//! `series/observations` endpoint.

use super::models::{FredErrorBody, ObservationsResponse};
use crate::adapters::provider::SeriesProvider;
use crate::config::SecretString;
use crate::domain::{DateRange, FundError, Observation, ProviderError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Production FRED API root
pub const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

const PROVIDER: &str = "FRED";

/// Observations requested when only the latest value is wanted
///
/// Daily series carry `.` on market holidays, so the newest row may be empty.
const LATEST_WINDOW: u32 = 10;

/// FRED client
pub struct FredClient {
    base_url: String,
    api_key: SecretString,
    client: Client,
}

impl FredClient {
    /// Create a client against the production API
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString) -> Result<Self> {
        Self::with_base_url(api_key, FRED_BASE_URL)
    }

    /// Create a client against `base_url`
    pub fn with_base_url(api_key: SecretString, base_url: impl Into<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FundError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn observations(&self, series: &str, extra: &[(&str, String)]) -> Result<Vec<Observation>> {
        let url = format!("{}/series/observations", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("series_id", series.to_string()),
            ("api_key", self.api_key.expose_secret().as_str().to_string()),
            ("file_type", "json".to_string()),
        ];
        query.extend(extra.iter().cloned());

        tracing::debug!(series, "Requesting FRED observations");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionFailed {
                provider: PROVIDER.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FredErrorBody>(&body)
                .ok()
                .and_then(|b| b.error_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let payload: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;

        let total = payload.observations.len();
        let observations: Vec<Observation> = payload
            .observations
            .iter()
            .filter_map(|raw| raw.parse())
            .collect();

        tracing::debug!(
            series,
            received = total,
            kept = observations.len(),
            "Parsed FRED observations"
        );
        Ok(observations)
    }
}

#[async_trait]
impl SeriesProvider for FredClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn latest(&self, series: &str) -> Result<Observation> {
        let observations = self
            .observations(
                series,
                &[
                    ("sort_order", "desc".to_string()),
                    ("limit", LATEST_WINDOW.to_string()),
                ],
            )
            .await?;

        observations
            .into_iter()
            .max_by_key(|o| o.date)
            .ok_or_else(|| ProviderError::NoData(series.to_string()).into())
    }

    async fn range(&self, series: &str, range: &DateRange) -> Result<Vec<Observation>> {
        let mut observations = self
            .observations(
                series,
                &[
                    ("observation_start", range.start().format("%Y-%m-%d").to_string()),
                    ("observation_end", range.end().format("%Y-%m-%d").to_string()),
                    ("sort_order", "asc".to_string()),
                ],
            )
            .await?;

        observations.retain(|o| range.contains(o.date));
        observations.sort_by_key(|o| o.date);
        if observations.is_empty() {
            return Err(ProviderError::NoData(series.to_string()).into());
        }
        Ok(observations)
    }
}
