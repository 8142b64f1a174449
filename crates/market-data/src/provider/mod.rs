//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` and `StatsProvider` traits
//! - Concrete provider implementations (Yahoo Finance, Google Finance)
//!
//! A provider makes one kind of upstream request and reports the value or a
//! [`MarketDataError`](crate::errors::MarketDataError). Ordering, fallback,
//! caching and timeouts live in the registry.

mod traits;

pub mod google_finance;
pub mod yahoo;

/// Browser user agent sent to upstreams that reject unknown clients.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

// Re-exports
pub use traits::{QuoteProvider, StatsProvider};

use rust_decimal::Decimal;

/// Decimal places kept when converting upstream floats.
const PRICE_SCALE: u32 = 4;

/// Convert an upstream float into a `Decimal`, rejecting NaN and infinities.
pub(crate) fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(PRICE_SCALE).normalize())
}
