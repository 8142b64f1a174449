//! Yahoo Finance API response models.
//!
//! These models are used for parsing the quoteSummary API responses, which
//! carry both the price backup and the valuation statistics.

use serde::Deserialize;

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

/// Quote summary container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<YahooQuoteSummaryResult>>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

/// Individual result from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub price: Option<YahooPriceData>,
    pub summary_detail: Option<YahooSummaryDetail>,
    pub default_key_statistics: Option<YahooDefaultKeyStatistics>,
}

/// Price data from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooPriceData {
    pub regular_market_price: Option<YahooPriceDetail>,
}

/// Value with raw and formatted representations.
///
/// Yahoo returns these as `{"raw": 123.45, "fmt": "123.45"}` or as empty
/// objects `{}` when no data is available.
#[derive(Debug, Deserialize, Clone)]
pub struct YahooPriceDetail {
    pub raw: Option<f64>,
    pub fmt: Option<String>,
}

/// Summary detail data (financial metrics)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryDetail {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<YahooPriceDetail>,
    // Note: forwardPE, marketCap, dividendYield etc. exist but are not used
}

/// Key statistics (share and fiscal calendar data)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooDefaultKeyStatistics {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<YahooPriceDetail>,
    pub last_fiscal_year_end: Option<YahooPriceDetail>,
    pub last_split_date: Option<YahooPriceDetail>,
}

impl YahooPriceDetail {
    /// Formatted text if present, otherwise the raw number as text.
    pub fn display_text(&self) -> Option<String> {
        self.fmt
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| self.raw.map(|r| r.to_string()))
    }
}
