use std::sync::Arc;

use crate::config::Config;
use pulsefolio_core::{
    CsvHoldingsSource, HoldingsSource, LiveMetricsServiceTrait, MarketDataClient,
    PortfolioService, PortfolioServiceTrait, RateLimiter,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub rate_limiter: Arc<RateLimiter>,
}

pub fn init_tracing() {
    let log_format = std::env::var("PULSE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let market_data: Arc<dyn LiveMetricsServiceTrait> =
        Arc::new(MarketDataClient::new(config.registry)?);
    tracing::info!(
        "Upstream timeout {:?}, price TTL {:?}, stats TTL {:?}",
        config.registry.upstream_timeout,
        config.registry.price_ttl,
        config.registry.stats_ttl
    );

    let holdings_source: Arc<dyn HoldingsSource> =
        Arc::new(CsvHoldingsSource::new(config.holdings_file.clone()));
    tracing::info!("Holdings file: {}", config.holdings_file.display());

    let portfolio_service: Arc<dyn PortfolioServiceTrait> = Arc::new(
        PortfolioService::new(holdings_source, market_data)
            .with_max_concurrent_fetches(config.max_concurrent_fetches),
    );

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
    tracing::info!(
        "Rate limit: {} requests per {:?}",
        config.rate_limit.max_requests,
        config.rate_limit.window
    );

    Ok(Arc::new(AppState {
        portfolio_service,
        rate_limiter,
    }))
}
