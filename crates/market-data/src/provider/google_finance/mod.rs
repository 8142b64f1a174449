//! Google Finance quote page scraper.
//!
//! Google Finance has no public API, so valuation statistics are read from the
//! "About" panel of `https://www.google.com/finance/quote/<SYMBOL>:<MARKET>`.
//! The markup changes without notice; every lookup here treats a missing
//! label as "no data" rather than an error.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::errors::MarketDataError;
use crate::models::{ExchangeCode, ValuationStats};
use crate::provider::{StatsProvider, USER_AGENT};

const PROVIDER_ID: &str = "GOOGLE_FINANCE";

const BASE_URL: &str = "https://www.google.com/finance/quote";

const PE_LABEL: &str = "P/E ratio";
const EARNINGS_LABELS: [&str; 2] = ["Earnings per share", "EPS (TTM)"];

/// Scrapes P/E ratio and earnings from Google Finance quote pages.
pub struct GoogleFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleFinanceProvider {
    /// Create a new provider whose requests are bounded by `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    fn quote_url(&self, symbol: &str, exchange: ExchangeCode) -> String {
        format!("{}/{}", self.base_url, exchange.google_symbol(symbol))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, MarketDataError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("HTTP {} from quote page", status),
            ));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl StatsProvider for GoogleFinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn valuation_stats(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
    ) -> Result<ValuationStats, MarketDataError> {
        let url = self.quote_url(symbol, exchange);
        debug!("Scraping Google Finance stats from {}", url);

        let body = self.fetch_page(&url).await?;
        Ok(parse_stats_page(&body))
    }
}

/// Extract valuation statistics from a Google Finance quote page.
pub fn parse_stats_page(html: &str) -> ValuationStats {
    let document = Html::parse_document(html);

    let pe_ratio = extract_stat(&document, PE_LABEL).and_then(|text| parse_ratio(&text));
    let latest_earnings = EARNINGS_LABELS
        .iter()
        .find_map(|label| extract_stat(&document, label));

    ValuationStats {
        pe_ratio,
        latest_earnings,
    }
}

/// Find the value text displayed next to `label`.
///
/// The label cell is the innermost `div` whose text contains `label`. Its
/// value is the next sibling `div` (tooltips excluded). Non-`div` wrappers
/// around the label such as `<span>` are stepped out of before looking at
/// siblings. Failing that, the second `div` under the label's parent is used.
fn extract_stat(document: &Html, label: &str) -> Option<String> {
    let divs = Selector::parse("div").ok()?;

    let label_node = document.select(&divs).find(|div| {
        element_text(div).contains(label)
            && !div
                .select(&divs)
                .any(|inner| element_text(&inner).contains(label))
    })?;

    let mut node = label_node;
    loop {
        if let Some(text) = next_value_div(node) {
            return Some(text);
        }
        match node.parent().and_then(ElementRef::wrap) {
            Some(parent) if parent.value().name() != "div" => node = parent,
            _ => break,
        }
    }

    label_node
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|parent| parent.select(&divs).nth(1))
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

fn next_value_div(node: ElementRef<'_>) -> Option<String> {
    node.next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div" && el.value().attr("role") != Some("tooltip"))
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a ratio such as `1,234.5`. Placeholders like `-` yield `None`.
fn parse_ratio(text: &str) -> Option<Decimal> {
    let cleaned = text.replace(',', "");
    cleaned.trim().parse::<Decimal>().ok()
}
