//! Fundamentals scraped from a Screener-style company page.
//!
//! # Page Layout
//! - `#top-ratios > li`: `.name` label plus `.value > span` figure
//!   (e.g. "Market Cap" → "₹ 1,23,456 Cr.")
//! - `#quarters` table: one row per line item, one column per quarter,
//!   oldest quarter first
//! - A `span` labelled "Piotroski score" followed by a sibling span with the score
//!
//! Only figures that are present on the page end up in the [`MetricSet`].

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use super::provider::{MetricSource, ProviderError};
use super::{metric, profit_growth_pct, sales_growth_pct, MetricSet};

/// Quarters between the latest column and its year-ago counterpart.
const QUARTERS_PER_YEAR: usize = 4;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?(?:\d*\.\d+|\d+)").unwrap());

fn selector(css: &str) -> Result<Selector, ProviderError> {
    Selector::parse(css).map_err(|e| ProviderError::Parse(format!("Invalid CSS selector {css}: {e:?}")))
}

/// Extract the first number from a figure like "₹ 1,23,456 Cr.".
fn parse_figure(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    NUMBER_PATTERN
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}

/// Collapse whitespace (including non-breaking spaces) and trailing expanders ("Sales +").
fn normalize_label(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('+')
        .trim_end()
        .to_string()
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

// ============================================================================
// Page Parsing
// ============================================================================

/// Parse a company page into a metric set.
pub fn parse_company_page(html: &str) -> Result<MetricSet, ProviderError> {
    let document = Html::parse_document(html);
    let mut metrics = MetricSet::new();

    parse_top_ratios(&document, &mut metrics)?;
    parse_quarterly_growth(&document, &mut metrics)?;
    parse_piotroski(&document, &mut metrics)?;

    Ok(metrics)
}

fn parse_top_ratios(document: &Html, metrics: &mut MetricSet) -> Result<(), ProviderError> {
    let items = selector("#top-ratios > li")?;
    let name_sel = selector(".name")?;
    let value_sel = selector(".value > span")?;

    for li in document.select(&items) {
        let Some(name) = li.select(&name_sel).next() else {
            continue;
        };
        let Some(value) = li.select(&value_sel).next() else {
            continue;
        };

        let name = normalize_label(&element_text(&name));
        if let Some(figure) = parse_figure(&element_text(&value)) {
            metrics.insert(name, figure);
        }
    }

    Ok(())
}

/// Numeric cells of a table row, oldest quarter first. Blank cells count as zero.
fn row_figures(row: &ElementRef<'_>, cell_sel: &Selector) -> Vec<f64> {
    row.select(cell_sel)
        .skip(1)
        .map(|td| parse_figure(&element_text(&td)).unwrap_or(0.0))
        .collect()
}

fn latest_and_year_ago(figures: &[f64]) -> Option<(f64, f64)> {
    let latest_idx = figures.len().checked_sub(1)?;
    let year_ago_idx = latest_idx.checked_sub(QUARTERS_PER_YEAR)?;
    Some((figures[latest_idx], figures[year_ago_idx]))
}

fn parse_quarterly_growth(document: &Html, metrics: &mut MetricSet) -> Result<(), ProviderError> {
    let rows = selector("#quarters tbody > tr")?;
    let cell_sel = selector("td")?;

    for row in document.select(&rows) {
        let Some(label_cell) = row.select(&cell_sel).next() else {
            continue;
        };
        let label = normalize_label(&element_text(&label_cell));
        let figures = row_figures(&row, &cell_sel);

        let Some((latest, year_ago)) = latest_and_year_ago(&figures) else {
            continue;
        };

        match label.as_str() {
            "Sales" | "Revenue" if !metrics.contains(metric::SALES_GROWTH_YOY) => {
                metrics.insert(metric::SALES_GROWTH_YOY, sales_growth_pct(latest, year_ago));
            }
            "Net Profit" if !metrics.contains(metric::PROFIT_GROWTH_YOY) => {
                metrics.insert(metric::PROFIT_GROWTH_YOY, profit_growth_pct(latest, year_ago));
            }
            _ => {}
        }
    }

    Ok(())
}

fn parse_piotroski(document: &Html, metrics: &mut MetricSet) -> Result<(), ProviderError> {
    if metrics.contains(metric::PIOTROSKI) {
        return Ok(());
    }

    let spans = selector("span")?;

    for span in document.select(&spans) {
        if !element_text(&span).contains(metric::PIOTROSKI) {
            continue;
        }

        let score = span
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "span")
            .and_then(|el| element_text(&el).trim().parse::<u8>().ok());

        if let Some(score) = score {
            metrics.insert(metric::PIOTROSKI, f64::from(score));
            break;
        }
    }

    Ok(())
}

// ============================================================================
// HTTP Source
// ============================================================================

/// Metric source backed by the fundamentals site.
pub struct ScreenerSiteSource {
    base_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl ScreenerSiteSource {
    /// Create a source for `base_url` (e.g. `https://www.screener.in`).
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            client,
        }
    }

    /// Create from config
    pub fn from_config(config: &quanta_common::SourcesConfig) -> Self {
        Self::new(
            config.metrics_base_url.clone(),
            config.user_agent.clone(),
            Duration::from_secs(config.metrics_timeout_secs),
        )
    }

    fn company_url(&self, bare_symbol: &str) -> String {
        format!("{}/company/{}/", self.base_url, bare_symbol)
    }
}

#[async_trait]
impl MetricSource for ScreenerSiteSource {
    fn name(&self) -> &'static str {
        "screener"
    }

    async fn fetch_metrics(&self, bare_symbol: &str) -> Result<MetricSet, ProviderError> {
        if bare_symbol.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("Empty symbol".into()));
        }

        let url = self.company_url(bare_symbol);
        debug!(url = %url, symbol = bare_symbol, "Fetching company page");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::DataNotAvailable(format!(
                "No company page for {bare_symbol}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: quanta_common::util::truncate_with_ellipsis(&body, 200),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let metrics = parse_company_page(&html)?;
        if metrics.is_empty() {
            return Err(ProviderError::DataNotAvailable(format!(
                "No recognizable figures on page for {bare_symbol}"
            )));
        }

        debug!(symbol = bare_symbol, metrics = metrics.len(), "Parsed company page");
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<ul id="top-ratios">
  <li><span class="name">Market Cap</span>
      <span class="nowrap value">₹ <span class="number">1,23,456</span> Cr.</span></li>
  <li><span class="name">Current Price</span>
      <span class="nowrap value">₹ <span class="number">3,480</span></span></li>
  <li><span class="name">High / Low</span>
      <span class="nowrap value">₹ <span class="number">4,592</span> / <span class="number">3,311</span></span></li>
  <li><span class="name">Stock P/E</span>
      <span class="nowrap value"><span class="number">26.4</span></span></li>
  <li><span class="name">ROCE</span>
      <span class="nowrap value"><span class="number">64.6</span> %</span></li>
  <li><span class="name">Debt to equity</span>
      <span class="nowrap value"><span class="number">0.09</span></span></li>
  <li><span class="name">Face Value</span>
      <span class="nowrap value">₹ <span class="number"></span></span></li>
</ul>
<section id="quarters">
  <table class="data-table">
    <thead><tr><th></th><th>Jun 2024</th><th>Sep 2024</th><th>Dec 2024</th><th>Mar 2025</th><th>Jun 2025</th></tr></thead>
    <tbody>
      <tr><td class="text">Sales&nbsp;+</td><td>1,000</td><td>1,050</td><td>1,080</td><td>1,100</td><td>1,150</td></tr>
      <tr><td class="text">Expenses&nbsp;+</td><td>700</td><td>720</td><td>730</td><td>750</td><td>780</td></tr>
      <tr><td class="text">Net Profit&nbsp;+</td><td>-50</td><td>20</td><td>25</td><td>30</td><td>10</td></tr>
    </tbody>
  </table>
</section>
<div class="sub"><span>Piotroski score</span> <span>7</span></div>
</body></html>
"#;

    #[test]
    fn test_parse_figure() {
        assert_eq!(parse_figure("₹ 1,23,456 Cr."), Some(123456.0));
        assert_eq!(parse_figure("26.4"), Some(26.4));
        assert_eq!(parse_figure("-12"), Some(-12.0));
        assert_eq!(parse_figure(".5 %"), Some(0.5));
        assert_eq!(parse_figure(""), None);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Sales\u{a0}+"), "Sales");
        assert_eq!(normalize_label("  Net   Profit + "), "Net Profit");
        assert_eq!(normalize_label("High / Low"), "High / Low");
    }

    #[test]
    fn test_parse_company_page() {
        let metrics = parse_company_page(PAGE).unwrap();

        assert_eq!(metrics.get(metric::MARKET_CAP), Some(123456.0));
        assert_eq!(metrics.get(metric::CURRENT_PRICE), Some(3480.0));
        assert_eq!(metrics.get(metric::HIGH_52W), Some(4592.0));
        assert_eq!(metrics.get(metric::STOCK_PE), Some(26.4));
        assert_eq!(metrics.get(metric::ROCE), Some(64.6));
        assert_eq!(metrics.get(metric::DEBT_TO_EQUITY), Some(0.09));
        assert_eq!(metrics.get(metric::PIOTROSKI), Some(7.0));
        assert!(!metrics.contains("Face Value"));

        // 1150 vs 1000 four quarters earlier
        assert_eq!(metrics.get(metric::SALES_GROWTH_YOY), Some(15.0));
        // year-ago loss turned into profit
        assert_eq!(metrics.get(metric::PROFIT_GROWTH_YOY), Some(100.0));
    }

    #[test]
    fn test_short_quarterly_table_yields_no_growth() {
        let html = r#"<section id="quarters"><table><tbody>
            <tr><td>Sales +</td><td>100</td><td>120</td></tr>
        </tbody></table></section>"#;
        let metrics = parse_company_page(html).unwrap();
        assert!(!metrics.contains(metric::SALES_GROWTH_YOY));
    }

    #[test]
    fn test_unrelated_page_is_empty() {
        let metrics = parse_company_page("<html><body><p>Not found</p></body></html>").unwrap();
        assert!(metrics.is_empty());
    }
}
