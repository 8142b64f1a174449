//! Live metrics service trait.

use async_trait::async_trait;

use pulsefolio_market_data::{ExchangeCode, MetricsReport};

/// Fetches live metrics for a single holding.
///
/// Implementations never fail: unavailable data is reported as absent
/// fields, with the reasons recorded in the report's diagnostics.
#[async_trait]
pub trait LiveMetricsServiceTrait: Send + Sync {
    async fn fetch_live_metrics(&self, symbol: &str, exchange: ExchangeCode) -> MetricsReport;
}
