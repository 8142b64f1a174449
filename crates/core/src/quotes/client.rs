//! Market Data Client - Facade for the market-data crate.
//!
//! ```text
//! PortfolioService ─▶ MarketDataClient ─▶ ProviderRegistry ─▶ Yahoo / Google Finance
//! ```

use async_trait::async_trait;
use log::info;

use pulsefolio_market_data::{ExchangeCode, MetricsReport, ProviderRegistry, RegistryConfig};

use super::LiveMetricsServiceTrait;
use crate::errors::Result;

/// Market data client - facade over the provider registry.
pub struct MarketDataClient {
    registry: ProviderRegistry,
}

impl MarketDataClient {
    /// Create a client backed by the default provider chain.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let registry = ProviderRegistry::with_default_providers(config)?;
        info!(
            "Market data client initialized with stats providers {:?}",
            registry.stats_provider_ids()
        );
        Ok(Self { registry })
    }

    /// Create a client around an existing registry.
    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

#[async_trait]
impl LiveMetricsServiceTrait for MarketDataClient {
    async fn fetch_live_metrics(&self, symbol: &str, exchange: ExchangeCode) -> MetricsReport {
        self.registry.fetch_live_metrics(symbol, exchange).await
    }
}
