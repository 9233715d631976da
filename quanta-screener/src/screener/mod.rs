//! Screener module.
//!
//! The scoring core and everything around it:
//!
//! - [`scoring`]: nine criteria, each a tagged outcome, summed to a 0-9 score
//! - [`ranker`]: threshold, stop/target levels, stable sort, truncation
//! - [`report`]: Markdown rendering of a ranking
//! - [`engine`]: the sequential run loop tying fetchers to the scorer
//!
//! # Usage
//!
//! ```ignore
//! use quanta_screener::screener::{format_report, ReportContext, ScreenerEngine};
//!
//! let engine = ScreenerEngine::new(config.screener.clone(), metrics, prices);
//! let summary = engine.run(&symbols, today).await;
//! let report = format_report(&summary.ranking, &ReportContext::from_config(&config));
//! ```

pub mod engine;
pub mod ranker;
pub mod report;
pub mod scoring;

pub use engine::{RunSummary, ScreenerEngine};
pub use ranker::{rank, Candidate, Ranking, RiskRewardRule, ScoredInstrument};
pub use report::{format_report, ReportContext, DISCLAIMER};
pub use scoring::{score, Criterion, CriterionOutcome, ScoreResult, MAX_SCORE};
