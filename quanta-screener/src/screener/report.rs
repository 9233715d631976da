//! Report rendering.
//!
//! Produces a single Markdown message (Telegram's legacy `*bold*` dialect).
//! Splitting into deliverable chunks is left to the notifier.

use quanta_common::Config;

use super::ranker::{Candidate, Ranking};
use super::scoring::MAX_SCORE;

/// Appended to every report, including the empty one.
pub const DISCLAIMER: &str = "\n\n*Disclaimer: This is an automated analysis for educational purposes and is NOT financial advice. \
Stock market investments are subject to market risks. No strategy guarantees returns. \
Data may be inaccurate. Always do your own research.*";

/// Run parameters quoted in the report text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    /// Minimum score used for the ranking
    pub threshold: u8,
    /// Index name, e.g. "nifty 500"
    pub index_name: String,
    /// Stop-loss percentage shown next to the stop level
    pub stop_loss_pct: f64,
}

impl ReportContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threshold: config.screener.score_threshold,
            index_name: config.universe.index_name.clone(),
            stop_loss_pct: config.screener.stop_loss_pct,
        }
    }
}

impl Default for ReportContext {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Render the ranking as a Markdown message.
pub fn format_report(ranking: &Ranking, ctx: &ReportContext) -> String {
    let mut message = if ranking.candidates.is_empty() {
        format!(
            "No stocks met the minimum score of {}/{} today.",
            ctx.threshold, MAX_SCORE
        )
    } else {
        let shown = ranking.shown();
        let mut message = format!("🚀 *Top {shown} Quant-amental Stock Candidates* 🚀\n\n");
        message.push_str(&format!(
            "Found {} stocks with a score of *{}/{}* or higher in {}. Showing the top {}.\n\n",
            ranking.total, ctx.threshold, MAX_SCORE, ctx.index_name, shown
        ));
        for candidate in &ranking.candidates {
            message.push_str(&format_candidate(candidate, ctx.stop_loss_pct));
        }
        message
    };

    message.push_str(DISCLAIMER);
    message
}

fn format_candidate(c: &Candidate, stop_loss_pct: f64) -> String {
    format!(
        "*{}* (Score: {}/{})\n\
         \x20 - *Price:* ₹{:.2}\n\
         \x20 - *Target:* ₹{:.2} (Time: {})\n\
         \x20 - *Stop Loss ({}%):* ₹{:.2}\n\
         \x20 - *Passed Criteria:* {}\n\n",
        c.symbol,
        c.score,
        MAX_SCORE,
        c.last_price,
        c.target_price,
        c.time_horizon,
        stop_loss_pct,
        c.stop_loss_price,
        c.passed_criteria.join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            symbol: "TCS.NS".into(),
            last_price: 100.0,
            stop_loss_price: 92.0,
            target_price: 116.0,
            time_horizon: "90-180 days".into(),
            passed_criteria: vec!["ROCE: 15.0%".into(), "RSI: 60.00".into()],
            score: 7,
        }
    }

    #[test]
    fn test_empty_report() {
        let report = format_report(&Ranking::default(), &ReportContext::default());
        assert_eq!(
            report,
            format!("No stocks met the minimum score of 6/9 today.{DISCLAIMER}")
        );
    }

    #[test]
    fn test_candidate_block() {
        let ranking = Ranking {
            candidates: vec![candidate()],
            total: 3,
        };
        let report = format_report(&ranking, &ReportContext::default());

        assert!(report.starts_with("🚀 *Top 1 Quant-amental Stock Candidates* 🚀\n\n"));
        assert!(report.contains(
            "Found 3 stocks with a score of *6/9* or higher in nifty 500. Showing the top 1.\n\n"
        ));
        assert!(report.contains(
            "*TCS.NS* (Score: 7/9)\n  - *Price:* ₹100.00\n  - *Target:* ₹116.00 (Time: 90-180 days)\n  - *Stop Loss (8%):* ₹92.00\n  - *Passed Criteria:* ROCE: 15.0%; RSI: 60.00\n\n"
        ));
        assert!(report.ends_with(DISCLAIMER));
    }
}
