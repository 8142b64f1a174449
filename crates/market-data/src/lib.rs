//! Pulsefolio Market Data Crate
//!
//! This crate fetches live metrics (current price, P/E ratio, latest
//! earnings) for Indian equities from multiple upstream providers.
//!
//! # Overview
//!
//! - Two venues: NSE and BSE, with per-provider symbol normalization
//! - Yahoo Finance for prices, Google Finance then Yahoo for statistics
//! - Independent TTL caches for prices and statistics
//! - Upstream timeouts and per-fetch diagnostics
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ProviderRegistry |  fetch_live_metrics(symbol, exchange)
//! +------------------+
//!      |         |
//!      v         v
//! +---------+ +-----------+
//! |  price  | |   stats   |   (concurrent, each behind a TtlCache)
//! +---------+ +-----------+
//!      |         |
//!      v         v
//!   Yahoo    Google Finance --(empty or failed)--> Yahoo quoteSummary
//! ```
//!
//! # Core Types
//!
//! - [`ExchangeCode`] - Venue a holding is quoted on
//! - [`LiveMetrics`] - Price and statistics for one symbol
//! - [`ValuationStats`] - P/E ratio and earnings as served by a stats provider
//! - [`MetricsReport`] - Live metrics plus the provider attempts behind them
//! - [`TtlCache`] - Key/value store with a fixed time-to-live

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{canonical_symbol, ExchangeCode, LiveMetrics, MetricsKind, ProviderId, ValuationStats};

// Re-export cache
pub use cache::TtlCache;

// Re-export provider types
pub use provider::google_finance::GoogleFinanceProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{QuoteProvider, StatsProvider};

// Re-export registry types
pub use registry::{
    AttemptOutcome, FetchDiagnostics, MetricsReport, ProviderAttempt, ProviderRegistry,
    RegistryConfig,
};

// Re-export error types
pub use errors::MarketDataError;
