//! Quanta Screener - scores an index universe and reports the top candidates.

use anyhow::{Context, Result};
use clap::Parser;
use quanta_common::config::Config;
use quanta_common::logging::init_logging;
use quanta_common::Error;
use std::path::PathBuf;
use std::sync::Arc;

use quanta_screener::data::{ChartApiProvider, ScreenerSiteSource};
use quanta_screener::notification::{ConsoleNotifier, Notifier, TelegramNotifier};
use quanta_screener::screener::{format_report, ReportContext, ScreenerEngine};
use quanta_screener::universe::{load_universe, RemoteUniverse, StaticUniverse, UniverseSource};

/// Quant-amental equity screener.
#[derive(Parser, Debug)]
#[command(name = "quanta-screener")]
#[command(version)]
#[command(about = "Score an index universe on fundamentals and momentum", long_about = None)]
struct Args {
    /// Config file (defaults to ~/.quanta/config.json)
    #[arg(short, long, env = "QUANTA_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum score (0-9) for a candidate
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Maximum candidates in the report
    #[arg(short, long)]
    max_reported: Option<usize>,

    /// Use the built-in symbol list instead of downloading the index
    #[arg(long)]
    static_universe: bool,

    /// Explicit comma-separated symbols (bare or suffixed)
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Print the report without delivering it
    #[arg(long)]
    dry_run: bool,

    /// Pause after each instrument, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(threshold) = self.threshold {
            config.screener.score_threshold = threshold;
        }
        if let Some(max) = self.max_reported {
            config.screener.max_reported = max;
        }
        if let Some(delay) = self.delay_ms {
            config.screener.instrument_delay_ms = delay;
        }
    }
}

async fn resolve_universe(args: &Args, config: &Config) -> quanta_common::Result<Vec<String>> {
    let suffix = &config.universe.symbol_suffix;

    if !args.symbols.is_empty() {
        let explicit = StaticUniverse::from_symbols(&args.symbols, suffix.clone());
        if explicit.is_empty() {
            return Err(Error::InvalidInput("--symbols contains no symbols".into()));
        }
        return explicit.symbols().await.map_err(Error::from);
    }

    let fallback = StaticUniverse::new(suffix.clone());
    if args.static_universe {
        return fallback
            .symbols()
            .await
            .map_err(|e| Error::from(e).with_context("Built-in universe unavailable"));
    }

    let remote = RemoteUniverse::from_config(config);
    Ok(load_universe(&remote, &fallback).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_overrides();
    args.apply(&mut config);
    config
        .validate()
        .map_err(Error::from)
        .context("Invalid configuration")?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Quanta Screener v{}", env!("CARGO_PKG_VERSION"));

    let symbols = resolve_universe(&args, &config).await?;
    tracing::info!(
        count = symbols.len(),
        threshold = config.screener.score_threshold,
        "Universe ready"
    );

    let engine = ScreenerEngine::new(
        config.screener.clone(),
        Arc::new(ScreenerSiteSource::from_config(&config.sources)),
        Arc::new(ChartApiProvider::from_config(&config.sources)),
    )
    .with_symbol_suffix(config.universe.symbol_suffix.clone());

    let today = chrono::Local::now().date_naive();
    let summary = engine.run(&symbols, today).await;

    let report = format_report(&summary.ranking, &ReportContext::from_config(&config));

    let console = ConsoleNotifier;
    console.deliver(&report).await;

    if args.dry_run {
        tracing::info!("Dry run, report not delivered");
        return Ok(());
    }

    let telegram = TelegramNotifier::new(&config.telegram);
    let delivery = telegram.deliver(&report).await;
    tracing::info!(
        notifier = telegram.name(),
        attempted = delivery.attempted,
        delivered = delivery.delivered,
        skipped = delivery.skipped,
        "Report delivery done"
    );

    Ok(())
}
