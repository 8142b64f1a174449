//! Quotes module - live metrics access for the portfolio pipeline.

mod client;
mod quotes_traits;

pub use client::MarketDataClient;
pub use quotes_traits::LiveMetricsServiceTrait;

pub use pulsefolio_market_data::{MetricsReport, RegistryConfig};
