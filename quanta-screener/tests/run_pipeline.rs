//! Integration tests for the screener run loop.
//!
//! Drives `ScreenerEngine` with in-memory providers to check the skip paths,
//! suffix handling and the ranking handed to the report.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use quanta_common::ScreenerConfig;
use quanta_screener::data::{
    metric, MetricSet, MetricSource, PriceBar, PriceHistoryProvider, PriceSeries, ProviderError,
};
use quanta_screener::screener::ScreenerEngine;

// ============================================================================
// Mock Providers
// ============================================================================

/// Metric source serving fixed metric sets by bare symbol.
struct MockMetrics {
    data: HashMap<String, MetricSet>,
    requested: Mutex<Vec<String>>,
}

impl MockMetrics {
    fn new(entries: Vec<(&str, MetricSet)>) -> Self {
        Self {
            data: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricSource for MockMetrics {
    fn name(&self) -> &'static str {
        "mock-metrics"
    }

    async fn fetch_metrics(&self, bare_symbol: &str) -> Result<MetricSet, ProviderError> {
        self.requested.lock().unwrap().push(bare_symbol.to_string());
        self.data
            .get(bare_symbol)
            .cloned()
            .ok_or_else(|| ProviderError::DataNotAvailable(bare_symbol.to_string()))
    }
}

/// Price provider generating a rising series of a configurable length.
struct MockPrices {
    bars: HashMap<String, usize>,
    fail: Vec<String>,
    calls: AtomicU32,
    window: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl MockPrices {
    fn new(bars: Vec<(&str, usize)>) -> Self {
        Self {
            bars: bars.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            fail: Vec::new(),
            calls: AtomicU32::new(0),
            window: Mutex::new(None),
        }
    }

    fn failing(mut self, symbol: &str) -> Self {
        self.fail.push(symbol.to_string());
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPrices {
    fn name(&self) -> &'static str {
        "mock-prices"
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.window.lock().unwrap() = Some((start, end));

        if self.fail.iter().any(|s| s == symbol) {
            return Err(ProviderError::Network("mock network failure".into()));
        }

        let count = self.bars.get(symbol).copied().unwrap_or(0);
        let bars = (0..count)
            .map(|i| PriceBar::new(start + Duration::days(i as i64), 100.0 + i as f64 * 0.5))
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn strong_metrics(price: f64) -> MetricSet {
    MetricSet::new()
        .with(metric::MARKET_CAP, 1000.0)
        .with(metric::SALES_GROWTH_YOY, 15.0)
        .with(metric::PROFIT_GROWTH_YOY, 20.0)
        .with(metric::PIOTROSKI, 7.0)
        .with(metric::DEBT_TO_EQUITY, 0.5)
        .with(metric::ROCE, 15.0)
        .with(metric::STOCK_PE, 25.0)
        .with(metric::HIGH_52W, 100.0)
        .with(metric::CURRENT_PRICE, price)
}

fn weak_metrics() -> MetricSet {
    MetricSet::new().with(metric::MARKET_CAP, 100.0)
}

fn config() -> ScreenerConfig {
    ScreenerConfig {
        instrument_delay_ms: 0,
        ..ScreenerConfig::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_ranks_candidates() {
    let metrics = Arc::new(MockMetrics::new(vec![
        ("TCS", strong_metrics(80.0)),
        ("INFY", weak_metrics()),
        ("WIPRO", strong_metrics(90.0)),
    ]));
    let prices = Arc::new(MockPrices::new(vec![
        ("TCS.NS", 250),
        ("INFY.NS", 250),
        ("WIPRO.NS", 250),
    ]));

    let engine = ScreenerEngine::new(config(), metrics.clone(), prices.clone());
    let summary = engine
        .run(&symbols(&["TCS.NS", "INFY.NS", "WIPRO.NS"]), today())
        .await;

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.scored, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let ranking = &summary.ranking;
    assert_eq!(ranking.total, 2);
    let order: Vec<&str> = ranking.candidates.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(order, vec!["TCS.NS", "WIPRO.NS"]);

    let tcs = &ranking.candidates[0];
    assert_eq!(tcs.score, 9);
    assert_eq!(tcs.last_price, 80.0);
    assert_eq!(tcs.stop_loss_price, 73.6);
    assert_eq!(tcs.target_price, 92.8);

    // metric source receives bare symbols
    assert_eq!(metrics.requested(), vec!["TCS", "INFY", "WIPRO"]);
}

#[tokio::test]
async fn test_short_history_is_skipped() {
    let metrics = Arc::new(MockMetrics::new(vec![
        ("NEWIPO", strong_metrics(80.0)),
        ("TCS", strong_metrics(80.0)),
    ]));
    let prices = Arc::new(MockPrices::new(vec![("NEWIPO.NS", 239), ("TCS.NS", 240)]));

    let engine = ScreenerEngine::new(config(), metrics, prices);
    let summary = engine.run(&symbols(&["NEWIPO.NS", "TCS.NS"]), today()).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.instruments[0].symbol, "TCS.NS");
}

#[tokio::test]
async fn test_fetch_failures_do_not_abort_the_run() {
    let metrics = Arc::new(MockMetrics::new(vec![
        ("TCS", strong_metrics(80.0)),
        ("HDFCBANK", strong_metrics(80.0)),
    ]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 250)]).failing("HDFCBANK.NS"));

    let engine = ScreenerEngine::new(config(), metrics, prices.clone());
    let summary = engine
        .run(&symbols(&["UNKNOWN.NS", "HDFCBANK.NS", "TCS.NS"]), today())
        .await;

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.ranking.total, 1);

    // metrics failure short-circuits before the price fetch
    assert_eq!(prices.calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn test_lookback_window() {
    let metrics = Arc::new(MockMetrics::new(vec![("TCS", strong_metrics(80.0))]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 250)]));

    let engine = ScreenerEngine::new(config(), metrics, prices.clone());
    engine.run(&symbols(&["TCS.NS"]), today()).await;

    let window = *prices.window.lock().unwrap();
    assert_eq!(
        window,
        Some((NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), today()))
    );
}

#[tokio::test]
async fn test_latest_price_falls_back_to_last_close() {
    let metrics = Arc::new(MockMetrics::new(vec![(
        "TCS",
        strong_metrics(80.0).with(metric::CURRENT_PRICE, 0.0),
    )]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 250)]));

    let engine = ScreenerEngine::new(config(), metrics, prices);
    let summary = engine.run(&symbols(&["TCS.NS"]), today()).await;

    // 100 + 249 * 0.5
    assert_eq!(summary.instruments[0].latest_price, 224.5);
    // no current price, so the 52-week proximity criterion is skipped
    assert_eq!(summary.instruments[0].result.score, 8);
}

#[tokio::test]
async fn test_custom_suffix_and_threshold() {
    let metrics = Arc::new(MockMetrics::new(vec![("AAPL", weak_metrics())]));
    let prices = Arc::new(MockPrices::new(vec![("AAPL.US", 250)]));

    let engine = ScreenerEngine::new(
        ScreenerConfig {
            score_threshold: 1,
            ..config()
        },
        metrics.clone(),
        prices,
    )
    .with_symbol_suffix(".US");
    let summary = engine.run(&symbols(&["AAPL.US"]), today()).await;

    assert_eq!(metrics.requested(), vec!["AAPL"]);
    // rising series: RSI 100 passes momentum; market cap 100 fails
    assert_eq!(summary.ranking.total, 1);
    assert_eq!(summary.ranking.candidates[0].score, 1);
}

#[tokio::test]
async fn test_empty_universe() {
    let engine = ScreenerEngine::new(
        config(),
        Arc::new(MockMetrics::new(Vec::new())),
        Arc::new(MockPrices::new(Vec::new())),
    );
    let summary = engine.run(&[], today()).await;

    assert_eq!(summary.scanned, 0);
    assert!(summary.ranking.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_instrument_delay_paces_every_symbol() {
    let metrics = Arc::new(MockMetrics::new(vec![
        ("TCS", strong_metrics(80.0)),
        ("INFY", weak_metrics()),
    ]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 250), ("INFY.NS", 10)]));

    let engine = ScreenerEngine::new(
        ScreenerConfig {
            instrument_delay_ms: 1500,
            ..config()
        },
        metrics,
        prices,
    );

    // scored, skipped and failed instruments are all followed by the pause
    let start = tokio::time::Instant::now();
    let summary = engine
        .run(&symbols(&["TCS.NS", "INFY.NS", "MISSING.NS"]), today())
        .await;

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(start.elapsed(), std::time::Duration::from_millis(4500));
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_does_not_sleep() {
    let metrics = Arc::new(MockMetrics::new(vec![("TCS", strong_metrics(80.0))]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 250)]));
    let engine = ScreenerEngine::new(config(), metrics, prices);

    let start = tokio::time::Instant::now();
    engine.run(&symbols(&["TCS.NS", "TCS.NS"]), today()).await;

    assert_eq!(start.elapsed(), std::time::Duration::ZERO);
}

#[tokio::test]
async fn test_huge_lookback_does_not_panic() {
    let metrics = Arc::new(MockMetrics::new(vec![("TCS", strong_metrics(80.0))]));
    let prices = Arc::new(MockPrices::new(vec![("TCS.NS", 0)]));

    let engine = ScreenerEngine::new(
        ScreenerConfig {
            lookback_days: u32::MAX,
            ..config()
        },
        metrics,
        prices.clone(),
    );
    let summary = engine.run(&symbols(&["TCS.NS"]), today()).await;

    assert_eq!(summary.skipped, 1);
    let window = *prices.window.lock().unwrap();
    assert_eq!(window, Some((NaiveDate::MIN, today())));
}
