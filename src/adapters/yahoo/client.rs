//! Yahoo Finance HTTP client
//!
//! Yahoo's JSON endpoints require a session cookie plus a matching "crumb"
//! token. The client fetches both lazily on first use, keeps them for its
//! lifetime, and renews them once when a request is rejected as
//! unauthorized.

use super::models::{ChartEnvelope, QuoteSummaryEnvelope, record_from_modules, QUOTE_SUMMARY_MODULES};
use crate::adapters::provider::{FundamentalProvider, SeriesProvider};
use crate::domain::{
    DateRange, FundError, FundamentalRecord, Market, Observation, ProviderError, Result, Symbol,
};
use async_trait::async_trait;
use chrono::NaiveTime;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;

/// Production API host
pub const YAHOO_API_URL: &str = "https://query2.finance.yahoo.com";

/// Host that hands out the session cookie
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

const PROVIDER: &str = "Yahoo Finance";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

fn connection_failed(err: reqwest::Error) -> FundError {
    ProviderError::ConnectionFailed {
        provider: PROVIDER.to_string(),
        message: err.without_url().to_string(),
    }
    .into()
}

/// Yahoo Finance client
pub struct YahooFinanceClient {
    api_url: String,
    cookie_url: String,
    client: Client,
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceClient {
    /// Create a client against the production hosts
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(YAHOO_API_URL, YAHOO_COOKIE_URL)
    }

    /// Create a client against custom hosts
    pub fn with_endpoints(api_url: impl Into<String>, cookie_url: impl Into<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FundError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            cookie_url: cookie_url.into(),
            client,
            crumb: Mutex::new(None),
        })
    }

    /// Returns the cached crumb, performing the handshake if needed
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        let crumb = self.handshake().await?;
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn handshake(&self) -> Result<String> {
        tracing::debug!("Starting Yahoo Finance session handshake");

        // The cookie host answers 404 while still setting the cookie.
        let response = self
            .client
            .get(&self.cookie_url)
            .send()
            .await
            .map_err(connection_failed)?;
        tracing::debug!(status = %response.status(), "Received session cookie response");

        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.api_url))
            .send()
            .await
            .map_err(connection_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::AuthenticationFailed(format!(
                "crumb request returned HTTP {status}"
            ))
            .into());
        }

        let crumb = response.text().await.map_err(connection_failed)?;
        let crumb = crumb.trim();
        if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
            return Err(ProviderError::AuthenticationFailed(
                "crumb response was not a token".to_string(),
            )
            .into());
        }

        tracing::debug!("Yahoo Finance session established");
        Ok(crumb.to_string())
    }

    async fn reset_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    /// GETs `url` with the crumb attached, renewing the session once on 401/403
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T> {
        for attempt in 0..2 {
            let crumb = self.crumb().await?;
            let response = self
                .client
                .get(url)
                .query(query)
                .query(&[("crumb", crumb.as_str())])
                .send()
                .await
                .map_err(connection_failed)?;

            let status = response.status();
            match status {
                // An expired cookie/crumb pair is renewed once. This redoes the
                // session handshake; failed requests are otherwise not retried.
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if attempt == 0 => {
                    tracing::warn!(%status, "Yahoo Finance rejected the session, renewing");
                    self.reset_crumb().await;
                    continue;
                }
                StatusCode::NOT_FOUND => {
                    return Err(ProviderError::NoData(subject.to_string()).into());
                }
                s if !s.is_success() => {
                    return Err(ProviderError::Status {
                        provider: PROVIDER.to_string(),
                        status: s.as_u16(),
                        message: s.canonical_reason().unwrap_or("error").to_string(),
                    }
                    .into());
                }
                _ => {}
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()).into());
        }

        Err(ProviderError::AuthenticationFailed(
            "session was rejected after renewal".to_string(),
        )
        .into())
    }

    async fn chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<Vec<Observation>> {
        let url = format!("{}/v8/finance/chart/{}", self.api_url, symbol);
        let envelope: ChartEnvelope = self.get_json(&url, query, symbol).await?;

        if let Some(error) = envelope.chart.error {
            return Err(ProviderError::InvalidResponse(format!(
                "{}: {}",
                error.code, error.description
            ))
            .into());
        }

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;
        Ok(result.daily_closes())
    }
}

#[async_trait]
impl FundamentalProvider for YahooFinanceClient {
    async fn fetch_fundamentals(
        &self,
        symbol: &Symbol,
        market: Market,
    ) -> Result<FundamentalRecord> {
        let provider_symbol = market.provider_symbol(symbol);
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.api_url, provider_symbol
        );
        let query = [("modules", QUOTE_SUMMARY_MODULES.join(","))];

        tracing::debug!(symbol = %symbol, provider_symbol, "Requesting quote summary");

        let envelope: QuoteSummaryEnvelope =
            self.get_json(&url, &query, &provider_symbol).await?;

        if let Some(error) = envelope.quote_summary.error {
            return Err(if error.code.eq_ignore_ascii_case("Not Found") {
                ProviderError::NoData(provider_symbol)
            } else {
                ProviderError::InvalidResponse(format!("{}: {}", error.code, error.description))
            }
            .into());
        }

        let modules = envelope
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(provider_symbol.clone()))?;

        let record = record_from_modules(symbol, market, &modules);
        if record.is_empty() {
            return Err(ProviderError::NoData(provider_symbol).into());
        }
        Ok(record)
    }
}

#[async_trait]
impl SeriesProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn latest(&self, series: &str) -> Result<Observation> {
        let query = [
            ("interval", "1d".to_string()),
            ("range", "1mo".to_string()),
        ];
        self.chart(series, &query)
            .await?
            .pop()
            .ok_or_else(|| ProviderError::NoData(series.to_string()).into())
    }

    async fn range(&self, series: &str, range: &DateRange) -> Result<Vec<Observation>> {
        let period1 = range.start().and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = range
            .end()
            .succ_opt()
            .unwrap_or(range.end())
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let query = [
            ("interval", "1d".to_string()),
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
        ];

        let mut observations = self.chart(series, &query).await?;
        observations.retain(|o| range.contains(o.date));
        if observations.is_empty() {
            return Err(ProviderError::NoData(series.to_string()).into());
        }
        Ok(observations)
    }
}
