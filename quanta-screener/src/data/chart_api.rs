//! Daily price history from a Yahoo-style chart API.
//!
//! # Endpoint
//! `GET {base}/v8/finance/chart/{symbol}?period1={unix}&period2={unix}&interval=1d`
//!
//! Adjusted closes (`indicators.adjclose`) are preferred over raw closes so
//! splits and dividends do not show up as price changes in the RSI.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::{PriceHistoryProvider, ProviderError};
use super::{PriceBar, PriceSeries};

/// Chart endpoint path
const CHART_ENDPOINT: &str = "/v8/finance/chart";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Convert a chart payload into a price series, dropping bars without a close.
fn series_from_response(symbol: &str, body: ChartResponse) -> Result<PriceSeries, ProviderError> {
    if let Some(err) = body.chart.error {
        return Err(ProviderError::DataNotAvailable(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| ProviderError::DataNotAvailable(format!("Empty chart for {symbol}")))?;

    let closes = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let bars = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PriceBar::new(date, close))
        })
        .collect();

    Ok(PriceSeries::new(symbol, bars))
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ============================================================================
// Chart API Provider
// ============================================================================

/// Price history provider backed by the chart API.
pub struct ChartApiProvider {
    base_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl ChartApiProvider {
    /// Create a provider for `base_url` (e.g. `https://query1.finance.yahoo.com`).
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            client,
        }
    }

    /// Create from config
    pub fn from_config(config: &quanta_common::SourcesConfig) -> Self {
        Self::new(
            config.prices_base_url.clone(),
            config.user_agent.clone(),
            Duration::from_secs(config.prices_timeout_secs),
        )
    }
}

#[async_trait]
impl PriceHistoryProvider for ChartApiProvider {
    fn name(&self) -> &'static str {
        "chart"
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        if start > end {
            return Err(ProviderError::InvalidRequest(format!(
                "Start {start} is after end {end}"
            )));
        }

        let url = format!("{}{}/{}", self.base_url, CHART_ENDPOINT, symbol);
        // period2 is exclusive; include the end date itself
        let period1 = unix_seconds(start);
        let period2 = unix_seconds(end) + 86_400;

        debug!(url = %url, symbol, %start, %end, "Fetching daily history");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: quanta_common::util::truncate_with_ellipsis(&body, 200),
            });
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse chart response: {e}")))?;

        let series = series_from_response(symbol, body)?;
        debug!(symbol, bars = series.len(), "Parsed daily history");
        Ok(series)
    }
}
