//! Market data provider trait definitions.
//!
//! Providers are split by the kind of data they serve: a [`QuoteProvider`]
//! answers "what does this symbol trade at right now", a [`StatsProvider`]
//! answers "what are its valuation ratio and latest earnings". One type may
//! implement both (Yahoo does).

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{ExchangeCode, ValuationStats};

/// Source of current market prices.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pulsefolio_market_data::provider::QuoteProvider;
///
/// struct FixedPrice;
///
/// #[async_trait]
/// impl QuoteProvider for FixedPrice {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn latest_price(
///         &self,
///         _symbol: &str,
///         _exchange: ExchangeCode,
///     ) -> Result<Decimal, MarketDataError> {
///         Ok(Decimal::ONE_HUNDRED)
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO". Used for logging and
    /// diagnostics.
    fn id(&self) -> &'static str;

    /// Fetch the current market price of `symbol` on `exchange`.
    ///
    /// `symbol` is the raw holding symbol; the provider applies its own
    /// venue-specific normalization.
    async fn latest_price(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
    ) -> Result<Decimal, MarketDataError>;
}

/// Source of valuation ratio and earnings figures.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Unique identifier for this provider.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch valuation statistics for `symbol` on `exchange`.
    ///
    /// Returning `Ok` with both fields absent is a legitimate "nothing found"
    /// answer; the registry then moves on to the next provider.
    async fn valuation_stats(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
    ) -> Result<ValuationStats, MarketDataError>;
}
