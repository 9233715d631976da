//! Configuration management for the Quanta screener.
//!
//! The screener reads a single JSON file at `~/.quanta/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (QUANTA_* prefix)
//! 3. Explicit config file values
//! 4. Default values
//!
//! # Environment Variable Mapping
//!
//! - `QUANTA_TELEGRAM_BOT_TOKEN` → telegram.bot_token
//! - `QUANTA_TELEGRAM_CHAT_ID` → telegram.chat_id
//! - `QUANTA_SCORE_THRESHOLD` → screener.score_threshold
//! - `QUANTA_MAX_REPORTED` → screener.max_reported
//! - `QUANTA_LOG_LEVEL` → observability.log_level
//! - `QUANTA_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".quanta"),
        |dirs| dirs.home_dir().join(".quanta"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Screener Configuration
// ============================================================================

/// Scoring, ranking and run-loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Minimum score (out of 9) for an instrument to become a candidate
    #[serde(default = "default_score_threshold")]
    pub score_threshold: u8,

    /// Maximum number of candidates shown in the report
    #[serde(default = "default_max_reported")]
    pub max_reported: usize,

    /// Price history lookback window in calendar days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Minimum number of daily bars for an instrument to be scored at all
    #[serde(default = "default_min_price_bars")]
    pub min_price_bars: usize,

    /// RSI smoothing period
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Minimum bars before the RSI is defined (one seed bar + period)
    #[serde(default = "default_rsi_min_bars")]
    pub rsi_min_bars: usize,

    /// Pause after each instrument, in milliseconds (third-party rate limits)
    #[serde(default = "default_instrument_delay_ms")]
    pub instrument_delay_ms: u64,

    /// Stop-loss distance below the last price, in percent
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    /// Target distance expressed as a multiple of the stop-loss distance
    #[serde(default = "default_reward_risk_ratio")]
    pub reward_risk_ratio: f64,

    /// Holding-period label attached to every candidate
    #[serde(default = "default_time_horizon")]
    pub time_horizon: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            max_reported: default_max_reported(),
            lookback_days: default_lookback_days(),
            min_price_bars: default_min_price_bars(),
            rsi_period: default_rsi_period(),
            rsi_min_bars: default_rsi_min_bars(),
            instrument_delay_ms: default_instrument_delay_ms(),
            stop_loss_pct: default_stop_loss_pct(),
            reward_risk_ratio: default_reward_risk_ratio(),
            time_horizon: default_time_horizon(),
        }
    }
}

impl ScreenerConfig {
    /// Target distance above the last price, in percent.
    pub fn target_pct(&self) -> f64 {
        self.stop_loss_pct * self.reward_risk_ratio
    }
}

fn default_score_threshold() -> u8 {
    6
}

fn default_max_reported() -> usize {
    15
}

fn default_lookback_days() -> u32 {
    365
}

fn default_min_price_bars() -> usize {
    240
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_min_bars() -> usize {
    15
}

fn default_instrument_delay_ms() -> u64 {
    1500
}

fn default_stop_loss_pct() -> f64 {
    8.0
}

fn default_reward_risk_ratio() -> f64 {
    2.0
}

fn default_time_horizon() -> String {
    "90-180 days".into()
}

// ============================================================================
// Universe Configuration
// ============================================================================

/// Instrument universe source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// CSV resource listing the index constituents (column `Symbol`)
    #[serde(default = "default_universe_csv_url")]
    pub csv_url: String,

    /// Market identifier appended to every bare symbol
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,

    /// Display name of the universe, used in the report
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Request timeout in seconds
    #[serde(default = "default_universe_timeout")]
    pub timeout_secs: u64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            csv_url: default_universe_csv_url(),
            symbol_suffix: default_symbol_suffix(),
            index_name: default_index_name(),
            timeout_secs: default_universe_timeout(),
        }
    }
}

fn default_universe_csv_url() -> String {
    "https://archives.nseindia.com/content/indices/ind_nifty500list.csv".into()
}

fn default_symbol_suffix() -> String {
    ".NS".into()
}

fn default_index_name() -> String {
    "nifty 500".into()
}

fn default_universe_timeout() -> u64 {
    10
}

// ============================================================================
// Data Sources Configuration
// ============================================================================

/// Endpoints for the fundamental metric and price history sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Base URL of the company fundamentals site
    #[serde(default = "default_metrics_base_url")]
    pub metrics_base_url: String,

    /// Metric fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub metrics_timeout_secs: u64,

    /// Base URL of the chart API serving daily bars
    #[serde(default = "default_prices_base_url")]
    pub prices_base_url: String,

    /// Price fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub prices_timeout_secs: u64,

    /// User-Agent header sent to both sources
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            metrics_base_url: default_metrics_base_url(),
            metrics_timeout_secs: default_fetch_timeout(),
            prices_base_url: default_prices_base_url(),
            prices_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_metrics_base_url() -> String {
    "https://www.screener.in".into()
}

fn default_prices_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
}

// ============================================================================
// Telegram Configuration
// ============================================================================

/// Report delivery over the Telegram Bot API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token (secret)
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Destination chat ID
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Bot API base URL
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Maximum characters per message; longer reports are split
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Pause between consecutive chunks, in milliseconds
    #[serde(default = "default_chunk_pause_ms")]
    pub chunk_pause_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_telegram_timeout")]
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: default_telegram_api_base(),
            max_message_length: default_max_message_length(),
            chunk_pause_ms: default_chunk_pause_ms(),
            timeout_secs: default_telegram_timeout(),
        }
    }
}

impl TelegramConfig {
    /// Returns `(bot_token, chat_id)` when both are usable.
    ///
    /// Empty values and unfilled placeholders (`<...>`, `YOUR_BOT_TOKEN`) count as absent.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().map(str::trim)?;
        let chat_id = self.chat_id.as_deref().map(str::trim)?;

        if is_placeholder(token) || is_placeholder(chat_id) {
            return None;
        }

        Some((token, chat_id))
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty()
        || value.contains("YOUR_BOT_TOKEN")
        || (value.starts_with('<') && value.ends_with('>'))
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".into()
}

fn default_max_message_length() -> usize {
    4096
}

fn default_chunk_pause_ms() -> u64 {
    1000
}

fn default_telegram_timeout() -> u64 {
    10
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the screener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scoring and ranking
    #[serde(default)]
    pub screener: ScreenerConfig,

    /// Instrument universe
    #[serde(default)]
    pub universe: UniverseConfig,

    /// Metric and price sources
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Report delivery
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparsable numeric values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("QUANTA_TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup("QUANTA_TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }

        if let Some(threshold) = lookup("QUANTA_SCORE_THRESHOLD") {
            if let Ok(t) = threshold.trim().parse() {
                self.screener.score_threshold = t;
            }
        }
        if let Some(max) = lookup("QUANTA_MAX_REPORTED") {
            if let Ok(m) = max.trim().parse() {
                self.screener.max_reported = m;
            }
        }

        if let Some(level) = lookup("QUANTA_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("QUANTA_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}
