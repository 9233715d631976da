//! Market data module.
//!
//! Holds the per-instrument inputs of a scoring pass and the adapters that
//! fetch them.
//!
//! # Data Sources
//! - **Screener site** (fundamentals): company page scraped into a [`MetricSet`]
//! - **Chart API** (technicals): daily bars over the lookback window as a [`PriceSeries`]

mod chart_api;
mod provider;
mod screener_site;

pub use chart_api::ChartApiProvider;
pub use provider::{MetricSource, PriceHistoryProvider, ProviderError};
pub use screener_site::{parse_company_page, ScreenerSiteSource};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Metric Names
// ============================================================================

/// Well-known metric keys, spelled the way the fundamentals site labels them.
pub mod metric {
    pub const MARKET_CAP: &str = "Market Cap";
    pub const CURRENT_PRICE: &str = "Current Price";
    /// 52-week high (the first figure of the site's "High / Low" ratio)
    pub const HIGH_52W: &str = "High / Low";
    pub const STOCK_PE: &str = "Stock P/E";
    pub const BOOK_VALUE: &str = "Book Value";
    pub const DIVIDEND_YIELD: &str = "Dividend Yield";
    pub const ROCE: &str = "ROCE";
    pub const ROE: &str = "ROE";
    pub const DEBT_TO_EQUITY: &str = "Debt to equity";
    pub const PIOTROSKI: &str = "Piotroski score";
    pub const SALES_GROWTH_YOY: &str = "YOY Quarterly Sales Growth";
    pub const PROFIT_GROWTH_YOY: &str = "YOY Quarterly Profit Growth";
}

// ============================================================================
// Metric Set
// ============================================================================

/// Named fundamental metrics for one instrument.
///
/// Keys may be missing; an absent key is never the same thing as a zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<String, f64>,
}

impl MetricSet {
    /// Create an empty metric set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a metric by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Insert or replace a metric.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ============================================================================
// Growth Rates
// ============================================================================

/// Year-over-year sales growth in percent.
///
/// A zero year-ago figure yields 0%.
pub fn sales_growth_pct(latest: f64, year_ago: f64) -> f64 {
    if year_ago == 0.0 {
        0.0
    } else {
        (latest - year_ago) / year_ago.abs() * 100.0
    }
}

/// Year-over-year net profit growth in percent.
///
/// Turnarounds from a loss (or zero) are pinned: a positive latest profit is
/// +100%, anything else is -100%.
pub fn profit_growth_pct(latest: f64, year_ago: f64) -> f64 {
    if year_ago > 0.0 {
        (latest - year_ago) / year_ago * 100.0
    } else if latest > 0.0 {
        100.0
    } else {
        -100.0
    }
}

// ============================================================================
// Price History
// ============================================================================

/// One trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price (split/dividend adjusted when the source provides it)
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily bars for one instrument, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Instrument symbol
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series; bars are sorted chronologically.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Most recent close.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Whether the series holds enough bars to be scored.
    pub fn is_usable(&self, min_bars: usize) -> bool {
        self.bars.len() >= min_bars
    }
}
