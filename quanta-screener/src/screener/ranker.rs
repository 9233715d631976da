//! Candidate ranking.
//!
//! Filters scored instruments by threshold, attaches fixed-percentage
//! stop-loss and target levels, and sorts by score.

use quanta_common::util::round2;
use quanta_common::ScreenerConfig;
use serde::{Deserialize, Serialize};

use super::scoring::ScoreResult;

/// One scored instrument, as produced by the run loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredInstrument {
    /// Suffixed symbol
    pub symbol: String,
    pub result: ScoreResult,
    /// Price used for stop-loss and target levels
    pub latest_price: f64,
}

impl ScoredInstrument {
    pub fn new(symbol: impl Into<String>, result: ScoreResult, latest_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            result,
            latest_price,
        }
    }
}

/// A reportable candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub last_price: f64,
    pub stop_loss_price: f64,
    pub target_price: f64,
    pub time_horizon: String,
    pub passed_criteria: Vec<String>,
    pub score: u8,
}

/// Fixed-percentage exit levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRewardRule {
    /// Stop distance below the price, in percent
    pub stop_loss_pct: f64,
    /// Target distance above the price, in percent
    pub target_pct: f64,
    /// Holding-period label
    pub time_horizon: String,
}

impl Default for RiskRewardRule {
    fn default() -> Self {
        Self::from_config(&ScreenerConfig::default())
    }
}

impl RiskRewardRule {
    pub fn from_config(config: &ScreenerConfig) -> Self {
        Self {
            stop_loss_pct: config.stop_loss_pct,
            target_pct: config.target_pct(),
            time_horizon: config.time_horizon.clone(),
        }
    }

    /// Stop-loss level, rounded to two decimals.
    pub fn stop_loss(&self, price: f64) -> f64 {
        round2(price * (1.0 - self.stop_loss_pct / 100.0))
    }

    /// Target level, rounded to two decimals.
    pub fn target(&self, price: f64) -> f64 {
        round2(price * (1.0 + self.target_pct / 100.0))
    }

    fn candidate(&self, scored: &ScoredInstrument) -> Candidate {
        Candidate {
            symbol: scored.symbol.clone(),
            last_price: scored.latest_price,
            stop_loss_price: self.stop_loss(scored.latest_price),
            target_price: self.target(scored.latest_price),
            time_horizon: self.time_horizon.clone(),
            passed_criteria: scored.result.passed_criteria.clone(),
            score: scored.result.score,
        }
    }
}

/// Ranked candidates plus the size of the list before truncation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// At most `max_reported` candidates, best first
    pub candidates: Vec<Candidate>,
    /// Number of instruments that met the threshold
    pub total: usize,
}

impl Ranking {
    pub fn shown(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Filter by `threshold`, sort by score (stable), truncate to `max_reported`.
pub fn rank(
    scored: &[ScoredInstrument],
    threshold: u8,
    max_reported: usize,
    rule: &RiskRewardRule,
) -> Ranking {
    let mut candidates: Vec<Candidate> = scored
        .iter()
        .filter(|s| s.result.score >= threshold)
        .map(|s| rule.candidate(s))
        .collect();

    // sort_by is stable: equal scores keep input order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let total = candidates.len();
    candidates.truncate(max_reported);

    Ranking { candidates, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(symbol: &str, score: u8, price: f64) -> ScoredInstrument {
        ScoredInstrument::new(
            symbol,
            ScoreResult {
                score,
                passed_criteria: vec![format!("{symbol} passed")],
            },
            price,
        )
    }

    #[test]
    fn test_levels_for_round_price() {
        let rule = RiskRewardRule::default();
        assert_eq!(rule.stop_loss(100.0), 92.0);
        assert_eq!(rule.target(100.0), 116.0);
        assert_eq!(rule.time_horizon, "90-180 days");
    }

    #[test]
    fn test_levels_are_rounded() {
        let rule = RiskRewardRule::default();
        assert_eq!(rule.stop_loss(123.45), 113.57);
        assert_eq!(rule.target(123.45), 143.2);
    }

    #[test]
    fn test_filter_sort_and_truncate() {
        let input = vec![
            scored("A.NS", 6, 10.0),
            scored("B.NS", 9, 10.0),
            scored("C.NS", 5, 10.0),
            scored("D.NS", 7, 10.0),
            scored("E.NS", 9, 10.0),
        ];

        let ranking = rank(&input, 6, 3, &RiskRewardRule::default());
        let symbols: Vec<&str> = ranking.candidates.iter().map(|c| c.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["B.NS", "E.NS", "D.NS"]);
        assert_eq!(ranking.total, 4);
        assert_eq!(ranking.shown(), 3);
    }

    #[test]
    fn test_no_candidates() {
        let ranking = rank(&[scored("A.NS", 2, 10.0)], 6, 15, &RiskRewardRule::default());
        assert!(ranking.is_empty());
        assert!(ranking.candidates.is_empty());
    }
}
