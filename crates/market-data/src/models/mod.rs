//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `exchange` - Venue codes and per-venue symbol normalization
//! - `metrics` - Live metrics and valuation statistics produced by providers

mod exchange;
mod metrics;
mod types;

pub use exchange::{canonical_symbol, ExchangeCode};
pub use metrics::{LiveMetrics, MetricsKind, ValuationStats};
pub use types::ProviderId;
