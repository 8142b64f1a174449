//! Exchange (venue) codes and provider-specific symbol normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trading venue a holding is quoted on.
///
/// Parsing is lenient: anything that is not recognised as `BSE` maps to
/// [`ExchangeCode::Nse`], so a holding with a typo in its exchange column is
/// still quoted with the NSE conventions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum ExchangeCode {
    /// National Stock Exchange of India.
    #[default]
    Nse,
    /// Bombay Stock Exchange.
    Bse,
}

impl ExchangeCode {
    /// Parse an exchange code, defaulting unknown values to NSE.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("BSE") {
            Self::Bse
        } else {
            Self::Nse
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Bse => "BSE",
        }
    }

    /// Yahoo Finance suffix for this venue (e.g. `.NS` for NSE).
    pub fn yahoo_suffix(&self) -> &'static str {
        match self {
            Self::Nse => ".NS",
            Self::Bse => ".BO",
        }
    }

    /// Market segment used in Google Finance quote URLs (`TCS:NSE`, `500325:BOM`).
    pub fn google_market(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Bse => "BOM",
        }
    }

    /// Build the Yahoo symbol for a raw ticker on this venue.
    ///
    /// ```
    /// use pulsefolio_market_data::ExchangeCode;
    ///
    /// assert_eq!(ExchangeCode::Nse.yahoo_symbol(" tcs "), "TCS.NS");
    /// assert_eq!(ExchangeCode::Bse.yahoo_symbol("reliance"), "RELIANCE.BO");
    /// ```
    pub fn yahoo_symbol(&self, symbol: &str) -> String {
        format!("{}{}", canonical_symbol(symbol), self.yahoo_suffix())
    }

    /// Build the Google Finance quote path segment (`SYMBOL:MARKET`).
    pub fn google_symbol(&self, symbol: &str) -> String {
        format!("{}:{}", canonical_symbol(symbol), self.google_market())
    }
}

impl From<String> for ExchangeCode {
    fn from(value: String) -> Self {
        Self::from_code(&value)
    }
}

impl From<&str> for ExchangeCode {
    fn from(value: &str) -> Self {
        Self::from_code(value)
    }
}

impl fmt::Display for ExchangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and uppercase a ticker before any venue suffix is applied.
pub fn canonical_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_defaults_to_nse() {
        assert_eq!(ExchangeCode::from_code("BSE"), ExchangeCode::Bse);
        assert_eq!(ExchangeCode::from_code(" bse "), ExchangeCode::Bse);
        assert_eq!(ExchangeCode::from_code("NSE"), ExchangeCode::Nse);
        assert_eq!(ExchangeCode::from_code("NASDAQ"), ExchangeCode::Nse);
        assert_eq!(ExchangeCode::from_code(""), ExchangeCode::Nse);
    }

    #[test]
    fn test_yahoo_symbol_normalizes_before_suffix() {
        assert_eq!(ExchangeCode::Nse.yahoo_symbol("hdfcbank"), "HDFCBANK.NS");
        assert_eq!(ExchangeCode::Bse.yahoo_symbol("  lt"), "LT.BO");
    }

    #[test]
    fn test_google_symbol() {
        assert_eq!(ExchangeCode::Nse.google_symbol("tcs"), "TCS:NSE");
        assert_eq!(ExchangeCode::Bse.google_symbol("RELIANCE"), "RELIANCE:BOM");
    }

    #[test]
    fn test_serde_round_trip_is_lenient() {
        let parsed: ExchangeCode = serde_json::from_str("\"bse\"").unwrap();
        assert_eq!(parsed, ExchangeCode::Bse);

        let unknown: ExchangeCode = serde_json::from_str("\"LSE\"").unwrap();
        assert_eq!(unknown, ExchangeCode::Nse);

        assert_eq!(serde_json::to_string(&ExchangeCode::Bse).unwrap(), "\"BSE\"");
    }
}
