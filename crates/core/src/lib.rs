//! Pulsefolio Core - holdings, snapshot calculation and the live pipeline.
//!
//! This crate turns a list of holdings into a [`PortfolioSnapshot`]: it loads
//! holdings from a [`HoldingsSource`], fetches live metrics for all of them
//! through the market-data crate, and values each holding and sector. It
//! also provides the [`RateLimiter`] guarding the public entry point.

pub mod constants;
pub mod errors;
pub mod holdings;
pub mod portfolio;
pub mod quotes;
pub mod throttle;

// Re-export common types from holdings and portfolio modules
pub use holdings::*;
pub use portfolio::*;

pub use quotes::{LiveMetricsServiceTrait, MarketDataClient};
pub use throttle::{RateLimitConfig, RateLimiter};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
