//! Data provider abstraction.
//!
//! Defines the traits the run loop fetches through, so the scoring pass can be
//! driven by live HTTP adapters or in-memory fixtures alike.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{MetricSet, PriceSeries};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors raised by external collaborators.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The source has nothing for this instrument
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Map a transport error, keeping timeouts and connection failures distinct.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("Request timeout".into())
        } else if err.is_connect() {
            Self::Network("Connection failed".into())
        } else {
            Self::Network(quanta_common::util::sanitize_for_log(&err.to_string()))
        }
    }
}

impl From<ProviderError> for quanta_common::Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidRequest(msg) => Self::InvalidInput(msg),
            other => Self::External(other.to_string()),
        }
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Source of fundamental metrics.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Fetch the metric set for a bare symbol (no market suffix).
    async fn fetch_metrics(&self, bare_symbol: &str) -> Result<MetricSet, ProviderError>;
}

/// Source of daily price history.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Fetch daily bars for `symbol` between `start` and `end` (inclusive).
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_common_error() {
        let err: quanta_common::Error = ProviderError::Network("reset".into()).into();
        assert!(matches!(err, quanta_common::Error::External(_)));
        assert_eq!(err.to_string(), "External service error: Network error: reset");

        let err: quanta_common::Error = ProviderError::InvalidRequest("empty symbol".into()).into();
        assert!(matches!(err, quanta_common::Error::InvalidInput(_)));
    }

    #[test]
    fn test_display() {
        let err = ProviderError::Http {
            status: 404,
            body: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }
}
