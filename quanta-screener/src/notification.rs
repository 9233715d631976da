//! Report delivery.
//!
//! Integrates with the Telegram Bot API to push the screener report to a chat.
//! Delivery is best effort: failures are logged, never retried, and never
//! affect the ranking that was already computed.

use async_trait::async_trait;
use quanta_common::util::{sanitize_for_log, split_chars};
use quanta_common::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of delivering one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Chunks sent (or attempted)
    pub attempted: usize,
    /// Chunks accepted by the destination
    pub delivered: usize,
    /// Delivery was not attempted at all
    pub skipped: bool,
}

impl DeliveryReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.skipped && self.attempted == self.delivered
    }
}

/// A destination for the formatted report.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name for logging
    fn name(&self) -> &'static str;

    /// Deliver `text`. Never fails; problems are reported in the result.
    async fn deliver(&self, text: &str) -> DeliveryReport;
}

/// Send `chunks` in order, pausing only between consecutive chunks.
///
/// A failed chunk is logged and the remaining chunks are still sent.
async fn send_chunks<F, Fut>(chunks: &[String], pause: Duration, mut send: F) -> DeliveryReport
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let mut report = DeliveryReport::default();

    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        report.attempted += 1;
        match send(chunk.clone()).await {
            Ok(()) => {
                report.delivered += 1;
                debug!(chunk = i + 1, total = chunks.len(), "Chunk sent");
            }
            Err(e) => {
                warn!(chunk = i + 1, total = chunks.len(), error = %e, "Chunk failed");
            }
        }
    }

    report
}

// ============================================================================
// Telegram
// ============================================================================

/// Request body for `sendMessage`
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    credentials: Option<(String, String)>,
    api_base: String,
    max_message_length: usize,
    chunk_pause: Duration,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier from the telegram section.
    ///
    /// Missing or placeholder credentials produce a notifier that skips delivery.
    pub fn new(config: &TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            credentials: config
                .credentials()
                .map(|(token, chat)| (token.to_string(), chat.to_string())),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_message_length: config.max_message_length,
            chunk_pause: Duration::from_millis(config.chunk_pause_ms),
            client,
        }
    }

    /// Check if credentials are configured
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn send_message_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }

    async fn send_chunk(&self, url: &str, chat_id: &str, text: &str) -> Result<(), String> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| sanitize_for_log(&e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(format!("HTTP {}: {}", status.as_u16(), error_text))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, text: &str) -> DeliveryReport {
        let Some((token, chat_id)) = &self.credentials else {
            warn!("Telegram bot token or chat id not set, skipping delivery");
            return DeliveryReport::skipped();
        };

        let send_url = self.send_message_url(token);
        let chunks = split_chars(text, self.max_message_length);
        let (url, chat_id) = (send_url.as_str(), chat_id.as_str());

        let report = send_chunks(&chunks, self.chunk_pause, |chunk| async move {
            self.send_chunk(url, chat_id, &chunk).await
        })
        .await;

        info!(
            delivered = report.delivered,
            attempted = report.attempted,
            "Telegram delivery finished"
        );
        report
    }
}

// ============================================================================
// Console
// ============================================================================

/// Prints the report to stdout instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, text: &str) -> DeliveryReport {
        println!("{text}");
        DeliveryReport {
            attempted: 1,
            delivered: 1,
            skipped: false,
        }
    }
}
