//! Nine-criterion scoring.
//!
//! Each criterion is a pure function of the metric set and the indicator set
//! and yields a tagged outcome. A passed criterion adds one point and a
//! description line; failed and skipped criteria add nothing. Missing inputs
//! never abort the pass.

use serde::{Deserialize, Serialize};

use crate::data::{metric, MetricSet};
use crate::indicators::IndicatorSet;

pub use quanta_common::validation::MAX_SCORE;

// ============================================================================
// Thresholds
// ============================================================================

const MIN_MARKET_CAP_CR: f64 = 500.0;
const MIN_SALES_GROWTH_PCT: f64 = 12.0;
const MIN_PROFIT_GROWTH_PCT: f64 = 12.0;
const MIN_PIOTROSKI: f64 = 5.0;
const MAX_DEBT_TO_EQUITY: f64 = 2.0;
const MIN_ROCE_PCT: f64 = 10.0;
const MAX_PE: f64 = 70.0;
const MAX_PCT_OFF_HIGH: f64 = 35.0;
const MIN_RSI: f64 = 45.0;

/// Unrounded ratio text; whole numbers keep one decimal (`25.0`, not `25`).
fn ratio(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ============================================================================
// Criterion
// ============================================================================

/// Outcome of one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "description", rename_all = "snake_case")]
pub enum CriterionOutcome {
    /// Threshold met; carries the report line
    Passed(String),
    /// Inputs present (or defaulted) and the threshold was missed
    Failed,
    /// Inputs absent; the criterion was not evaluated
    Skipped,
}

impl CriterionOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    fn check(passed: bool, describe: impl FnOnce() -> String) -> Self {
        if passed {
            Self::Passed(describe())
        } else {
            Self::Failed
        }
    }
}

/// The scoring criteria, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    MarketCap,
    SalesGrowth,
    ProfitGrowth,
    Piotroski,
    DebtToEquity,
    Roce,
    PriceToEarnings,
    NearYearHigh,
    Momentum,
}

impl Criterion {
    /// All criteria in the fixed evaluation order.
    pub const ALL: [Criterion; 9] = [
        Criterion::MarketCap,
        Criterion::SalesGrowth,
        Criterion::ProfitGrowth,
        Criterion::Piotroski,
        Criterion::DebtToEquity,
        Criterion::Roce,
        Criterion::PriceToEarnings,
        Criterion::NearYearHigh,
        Criterion::Momentum,
    ];

    /// Evaluate this criterion.
    pub fn evaluate(self, metrics: &MetricSet, indicators: &IndicatorSet) -> CriterionOutcome {
        match self {
            Self::MarketCap => {
                let cap = metrics.get(metric::MARKET_CAP).unwrap_or(0.0);
                CriterionOutcome::check(cap > MIN_MARKET_CAP_CR, || {
                    format!("Market Cap: {cap:.2} Cr")
                })
            }
            Self::SalesGrowth => {
                let growth = metrics.get(metric::SALES_GROWTH_YOY).unwrap_or(0.0);
                CriterionOutcome::check(growth >= MIN_SALES_GROWTH_PCT, || {
                    format!("Qtr Sales Growth: {growth:.2}%")
                })
            }
            Self::ProfitGrowth => {
                let growth = metrics.get(metric::PROFIT_GROWTH_YOY).unwrap_or(0.0);
                CriterionOutcome::check(growth >= MIN_PROFIT_GROWTH_PCT, || {
                    format!("Qtr Profit Growth: {growth:.2}%")
                })
            }
            Self::Piotroski => {
                let piotroski = metrics.get(metric::PIOTROSKI).unwrap_or(0.0);
                CriterionOutcome::check(piotroski > MIN_PIOTROSKI, || {
                    format!("Piotroski Score: {}", piotroski.round() as i64)
                })
            }
            Self::DebtToEquity => match metrics.get(metric::DEBT_TO_EQUITY) {
                Some(de) => CriterionOutcome::check(de < MAX_DEBT_TO_EQUITY, || {
                    format!("D/E Ratio: {}", ratio(de))
                }),
                None => CriterionOutcome::Failed,
            },
            Self::Roce => {
                let roce = metrics.get(metric::ROCE).unwrap_or(0.0);
                CriterionOutcome::check(roce > MIN_ROCE_PCT, || {
                    format!("ROCE: {}%", ratio(roce))
                })
            }
            Self::PriceToEarnings => match metrics.get(metric::STOCK_PE) {
                Some(pe) => CriterionOutcome::check(pe > 0.0 && pe < MAX_PE, || {
                    format!("P/E Ratio: {}", ratio(pe))
                }),
                None => CriterionOutcome::Failed,
            },
            Self::NearYearHigh => {
                let high = metrics.get(metric::HIGH_52W).filter(|h| *h != 0.0 && h.is_finite());
                let price = metrics.get(metric::CURRENT_PRICE).filter(|p| *p != 0.0 && p.is_finite());
                match (high, price) {
                    (Some(high), Some(price)) => {
                        let pct_off = (high - price) / high * 100.0;
                        CriterionOutcome::check(pct_off <= MAX_PCT_OFF_HIGH, || {
                            format!("Price near 52W High ({pct_off:.2}% off)")
                        })
                    }
                    _ => CriterionOutcome::Skipped,
                }
            }
            Self::Momentum => match indicators.rsi.filter(|r| !r.is_nan()) {
                Some(rsi) => CriterionOutcome::check(rsi > MIN_RSI, || format!("RSI: {rsi:.2}")),
                None => CriterionOutcome::Skipped,
            },
        }
    }
}

// ============================================================================
// Score
// ============================================================================

/// Score of one instrument with its explanation trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Number of passed criteria, 0..=9
    pub score: u8,
    /// Descriptions of passed criteria, in evaluation order
    pub passed_criteria: Vec<String>,
}

/// Evaluate every criterion and sum the passes.
pub fn score(metrics: &MetricSet, indicators: &IndicatorSet) -> ScoreResult {
    let mut result = ScoreResult::default();

    for criterion in Criterion::ALL {
        if let CriterionOutcome::Passed(description) = criterion.evaluate(metrics, indicators) {
            result.score += 1;
            result.passed_criteria.push(description);
        }
    }

    result
}
