//! Screener run loop.
//!
//! Walks the universe one instrument at a time: fetch metrics, fetch price
//! history, compute indicators, score. Fetch failures and short histories skip
//! the instrument and the loop moves on.

use chrono::{Days, NaiveDate};
use quanta_common::ScreenerConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::data::{metric, MetricSet, MetricSource, PriceHistoryProvider, PriceSeries};
use crate::indicators::IndicatorSet;
use crate::universe::strip_suffix;

use super::ranker::{rank, Ranking, RiskRewardRule, ScoredInstrument};
use super::scoring::{score, MAX_SCORE};

// ============================================================================
// Run Summary
// ============================================================================

/// Outcome of one pass over the universe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Instruments visited
    pub scanned: usize,
    /// Instruments that received a score
    pub scored: usize,
    /// Instruments skipped for insufficient price history
    pub skipped: usize,
    /// Instruments whose metric or price fetch failed
    pub failed: usize,
    /// Every scored instrument, in universe order
    pub instruments: Vec<ScoredInstrument>,
    /// Thresholded and sorted candidates
    pub ranking: Ranking,
}

/// Per-instrument result inside the loop.
enum InstrumentOutcome {
    Scored(ScoredInstrument),
    Skipped,
    Failed,
}

// ============================================================================
// Screener Engine
// ============================================================================

/// Sequential screener over a metric source and a price provider.
pub struct ScreenerEngine<M: MetricSource, P: PriceHistoryProvider> {
    config: ScreenerConfig,
    symbol_suffix: String,
    rule: RiskRewardRule,
    metrics: Arc<M>,
    prices: Arc<P>,
}

impl<M: MetricSource, P: PriceHistoryProvider> ScreenerEngine<M, P> {
    /// Create a new engine. Symbols are assumed to carry the `.NS` suffix.
    pub fn new(config: ScreenerConfig, metrics: Arc<M>, prices: Arc<P>) -> Self {
        let rule = RiskRewardRule::from_config(&config);
        Self {
            config,
            symbol_suffix: ".NS".into(),
            rule,
            metrics,
            prices,
        }
    }

    /// Market suffix stripped before querying the metric source.
    pub fn with_symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    /// Score every symbol and rank the results.
    ///
    /// Price history covers `[today - lookback_days, today]`.
    pub async fn run(&self, symbols: &[String], today: NaiveDate) -> RunSummary {
        let total = symbols.len();
        let start = lookback_start(today, self.config.lookback_days);
        let delay = Duration::from_millis(self.config.instrument_delay_ms);

        info!(
            total,
            threshold = self.config.score_threshold,
            max_score = MAX_SCORE,
            "Starting quant-amental scoring"
        );

        let mut summary = RunSummary::default();

        for (i, symbol) in symbols.iter().enumerate() {
            info!("({}/{}) Analyzing {}", i + 1, total, symbol);
            summary.scanned += 1;

            match self.process(symbol, start, today).await {
                InstrumentOutcome::Scored(scored) => {
                    summary.scored += 1;
                    summary.instruments.push(scored);
                }
                InstrumentOutcome::Skipped => summary.skipped += 1,
                InstrumentOutcome::Failed => summary.failed += 1,
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        summary.ranking = rank(
            &summary.instruments,
            self.config.score_threshold,
            self.config.max_reported,
            &self.rule,
        );

        info!(
            scanned = summary.scanned,
            scored = summary.scored,
            skipped = summary.skipped,
            failed = summary.failed,
            candidates = summary.ranking.total,
            "Scoring run complete"
        );

        summary
    }

    async fn process(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> InstrumentOutcome {
        let bare = strip_suffix(symbol, &self.symbol_suffix);

        let metrics = match self.metrics.fetch_metrics(bare).await {
            Ok(m) => m,
            Err(e) => {
                warn!(symbol, source = self.metrics.name(), error = %e, "Metric fetch failed, skipping");
                return InstrumentOutcome::Failed;
            }
        };

        let series = match self.prices.daily_history(symbol, start, end).await {
            Ok(s) => s,
            Err(e) => {
                warn!(symbol, provider = self.prices.name(), error = %e, "Price fetch failed, skipping");
                return InstrumentOutcome::Failed;
            }
        };

        if !series.is_usable(self.config.min_price_bars) {
            info!(
                symbol,
                bars = series.len(),
                required = self.config.min_price_bars,
                "Insufficient price history, skipping"
            );
            return InstrumentOutcome::Skipped;
        }

        let indicators =
            IndicatorSet::compute(&series, self.config.rsi_period, self.config.rsi_min_bars);
        let result = score(&metrics, &indicators);
        debug!(symbol, rsi = ?indicators.rsi, "Indicators computed");
        info!(symbol, score = result.score, "Score {}/{}", result.score, MAX_SCORE);

        let latest_price = latest_price(&metrics, &series);
        if result.score >= self.config.score_threshold {
            info!(symbol, score = result.score, price = latest_price, "Added candidate");
        }

        InstrumentOutcome::Scored(ScoredInstrument::new(symbol, result, latest_price))
    }
}

/// First day of the price window, clamped to the earliest representable date.
fn lookback_start(today: NaiveDate, lookback_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// `Current Price` when the metric source has a positive one, else the last close.
fn latest_price(metrics: &MetricSet, series: &PriceSeries) -> f64 {
    metrics
        .get(metric::CURRENT_PRICE)
        .filter(|p| *p > 0.0)
        .or_else(|| series.last_close())
        .unwrap_or(0.0)
}
