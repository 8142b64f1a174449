//! Core error types for the Pulsefolio pipeline.
//!
//! Upstream provider failures are not represented here: the market data
//! chain recovers from them and reports absent values instead. What remains
//! are the conditions that make a whole snapshot impossible.

use thiserror::Error;

use pulsefolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Holdings source unavailable: {0}")]
    HoldingsSource(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::HoldingsSource("no holdings found".to_string());
        assert_eq!(
            error.to_string(),
            "Holdings source unavailable: no holdings found"
        );

        let error: Error = MarketDataError::SymbolNotFound("TCS.NS".to_string()).into();
        assert_eq!(
            error.to_string(),
            "Market data operation failed: Symbol not found: TCS.NS"
        );
    }
}
