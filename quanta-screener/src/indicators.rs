//! Technical indicators derived from daily closes.
//!
//! Only the relative strength index is needed by the scoring pass. It uses
//! Wilder's smoothing: the first average is a simple mean of the first
//! `period` changes, each later average is `(prev * (period - 1) + x) / period`.

use serde::{Deserialize, Serialize};

use crate::data::PriceSeries;

/// Indicators computed for one instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// RSI of the most recent bar; `None` when the series is too short
    pub rsi: Option<f64>,
}

impl IndicatorSet {
    /// Compute indicators for `series`.
    pub fn compute(series: &PriceSeries, rsi_period: usize, rsi_min_bars: usize) -> Self {
        Self {
            rsi: rsi(&series.closes(), rsi_period, rsi_min_bars),
        }
    }

    /// Indicators with a known RSI (fixtures and replays).
    pub fn with_rsi(rsi: f64) -> Self {
        Self { rsi: Some(rsi) }
    }
}

/// Wilder RSI of the last close in `closes` (oldest first).
///
/// Returns `None` with fewer than `max(min_bars, period + 1)` closes, or when
/// the window has no price movement at all.
pub fn rsi(closes: &[f64], period: usize, min_bars: usize) -> Option<f64> {
    if period == 0 || closes.len() < min_bars.max(period + 1) {
        return None;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let n = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / n;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / n;

    for (gain, loss) in gains[period..].iter().zip(&losses[period..]) {
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
    }

    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }

    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => None,
        (_, true) => Some(100.0),
        (true, _) => Some(0.0),
        _ => Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss)),
    }
}
