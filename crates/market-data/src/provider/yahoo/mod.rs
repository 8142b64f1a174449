//! Yahoo Finance market data provider.
//!
//! Serves two roles in the chain:
//! - primary quote source (current market price for `SYMBOL.NS` / `SYMBOL.BO`)
//! - secondary statistics source (trailing P/E and fiscal calendar from the
//!   quoteSummary API), used when the Google Finance scrape finds nothing

mod models;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{ExchangeCode, ValuationStats};
use crate::provider::{decimal_from_f64, QuoteProvider, StatsProvider, USER_AGENT};

use models::{YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";

const STATS_MODULES: &str = "summaryDetail,defaultKeyStatistics";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    ///
    /// `request_timeout` bounds every direct HTTP call made by the provider.
    pub fn new(request_timeout: Duration) -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            connector,
            client,
            crumb: RwLock::new(None),
        })
    }

    fn read_crumb(&self) -> RwLockReadGuard<'_, Option<CrumbData>> {
        self.crumb.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_crumb(&self) -> RwLockWriteGuard<'_, Option<CrumbData>> {
        self.crumb.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        if let Some(crumb) = self.read_crumb().as_ref() {
            return Ok(crumb.clone());
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Failed to parse Yahoo cookie"))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to get crumb: {}", e)))?
            .text()
            .await
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to read crumb: {}", e)))?;

        let crumb_data = CrumbData { cookie, crumb };
        *self.write_crumb() = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *self.write_crumb() = None;
    }

    // ========================================================================
    // quoteSummary
    // ========================================================================

    /// Call the quoteSummary API for `yahoo_symbol` with the given modules.
    async fn fetch_quote_summary(
        &self,
        yahoo_symbol: &str,
        modules: &str,
    ) -> Result<YahooQuoteSummaryResult, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            encode(yahoo_symbol),
            encode(modules),
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("quoteSummary request failed: {}", e))
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                "Yahoo authentication expired",
            ));
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(yahoo_symbol.to_string()));
        }

        let data: YahooQuoteSummaryResponse = response.json().await.map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to parse quoteSummary response: {}", e),
            )
        })?;

        data.quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::SymbolNotFound(yahoo_symbol.to_string()))
    }

    // ========================================================================
    // Price Fetching
    // ========================================================================

    /// Fetch latest price using primary method (library API).
    async fn fetch_price_primary(&self, yahoo_symbol: &str) -> Result<Decimal, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(yahoo_symbol, "1d")
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    MarketDataError::SymbolNotFound(yahoo_symbol.to_string())
                } else {
                    MarketDataError::provider(PROVIDER_ID, e.to_string())
                }
            })?;

        let yahoo_quote = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", yahoo_symbol, e);
            MarketDataError::SymbolNotFound(yahoo_symbol.to_string())
        })?;

        decimal_from_f64(yahoo_quote.close).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Non-numeric close price {} for {}", yahoo_quote.close, yahoo_symbol),
        })
    }

    /// Fetch latest price using backup method (quoteSummary `price` module).
    async fn fetch_price_backup(&self, yahoo_symbol: &str) -> Result<Decimal, MarketDataError> {
        let result = self.fetch_quote_summary(yahoo_symbol, "price").await?;

        result
            .price
            .as_ref()
            .and_then(|p| p.regular_market_price.as_ref())
            .and_then(|p| p.raw)
            .and_then(decimal_from_f64)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("No valid price in backup response for {}", yahoo_symbol),
            })
    }
}

/// Extract valuation statistics from a quoteSummary result.
///
/// P/E comes from `summaryDetail.trailingPE`, else
/// `defaultKeyStatistics.trailingPE`. The earnings text is the last fiscal
/// year end, else the last split date, exactly as Yahoo formats them.
fn stats_from_summary(result: &YahooQuoteSummaryResult) -> ValuationStats {
    let key_stats = result.default_key_statistics.as_ref();

    let pe_ratio = result
        .summary_detail
        .as_ref()
        .and_then(|d| d.trailing_pe.as_ref())
        .and_then(|p| p.raw)
        .or_else(|| key_stats.and_then(|k| k.trailing_pe.as_ref()).and_then(|p| p.raw))
        .and_then(decimal_from_f64);

    let latest_earnings = key_stats.and_then(|k| {
        k.last_fiscal_year_end
            .as_ref()
            .and_then(|d| d.display_text())
            .or_else(|| k.last_split_date.as_ref().and_then(|d| d.display_text()))
    });

    ValuationStats {
        pe_ratio,
        latest_earnings,
    }
}

// ============================================================================
// Provider Implementations
// ============================================================================

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn latest_price(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
    ) -> Result<Decimal, MarketDataError> {
        let yahoo_symbol = exchange.yahoo_symbol(symbol);

        debug!("Fetching latest price for {} from Yahoo", yahoo_symbol);

        // Try primary method first
        match self.fetch_price_primary(&yahoo_symbol).await {
            Ok(price) => return Ok(price),
            Err(e) => {
                debug!(
                    "Primary price fetch failed for {}: {}, trying backup",
                    yahoo_symbol, e
                );
            }
        }

        // Fallback to quoteSummary price data
        self.fetch_price_backup(&yahoo_symbol).await
    }
}

#[async_trait]
impl StatsProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn valuation_stats(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
    ) -> Result<ValuationStats, MarketDataError> {
        let yahoo_symbol = exchange.yahoo_symbol(symbol);

        debug!("Fetching valuation stats for {} from Yahoo", yahoo_symbol);

        let result = self.fetch_quote_summary(&yahoo_symbol, STATS_MODULES).await?;
        Ok(stats_from_summary(&result))
    }
}
