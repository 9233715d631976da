//! Quanta Screener Library
//!
//! Scores an index universe of equities on nine fundamental and momentum
//! criteria and reports the top-ranked candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Universe    │──▶│  Metrics +   │──▶│  Indicators  │──▶│   Scoring    │
//! │  (CSV/static)│   │  Price bars  │   │  (RSI)       │   │   (0-9)      │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                                                 │
//!                    ┌──────────────┐   ┌──────────────┐   ┌──────▼───────┐
//!                    │  Notifier    │◀──│  Report      │◀──│   Ranker     │
//!                    │  (Telegram)  │   │  (Markdown)  │   │              │
//!                    └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Instruments are processed one at a time. A failed fetch skips the
//! instrument; it never aborts the run.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod indicators;
pub mod notification;
pub mod screener;
pub mod universe;

pub use data::{MetricSet, MetricSource, PriceBar, PriceHistoryProvider, PriceSeries, ProviderError};
pub use indicators::IndicatorSet;
pub use notification::{ConsoleNotifier, DeliveryReport, Notifier, TelegramNotifier};
pub use screener::{
    format_report, rank, score, Candidate, Criterion, CriterionOutcome, Ranking, ReportContext,
    RiskRewardRule, RunSummary, ScoreResult, ScoredInstrument, ScreenerEngine,
};
pub use universe::{load_universe, RemoteUniverse, StaticUniverse, UniverseSource};
