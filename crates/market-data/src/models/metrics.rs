//! Live metrics produced by the provider chain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of data fetched for a holding. Each kind has its own cache.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MetricsKind {
    /// Current market price.
    Price,
    /// Valuation ratio and earnings.
    Stats,
}

impl MetricsKind {
    /// Prefix used when building cache keys.
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            Self::Price => "cmp",
            Self::Stats => "stats",
        }
    }
}

impl std::fmt::Display for MetricsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Price => write!(f, "price"),
            Self::Stats => write!(f, "stats"),
        }
    }
}

/// Valuation statistics for a symbol.
///
/// `latest_earnings` is kept as the provider formatted it. Depending on which
/// source answered it can be an EPS figure, a fiscal-year-end date or a split
/// date, so no stricter type is inferred.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationStats {
    pub pe_ratio: Option<Decimal>,
    pub latest_earnings: Option<String>,
}

impl ValuationStats {
    /// True when neither field carries a value.
    pub fn is_empty(&self) -> bool {
        self.pe_ratio.is_none() && self.latest_earnings.is_none()
    }
}

/// Live market data for a single holding. Absent fields mean "unavailable".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub cmp: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub latest_earnings: Option<String>,
}

impl LiveMetrics {
    /// Metrics with every field absent.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_parts(cmp: Option<Decimal>, stats: ValuationStats) -> Self {
        Self {
            cmp,
            pe_ratio: stats.pe_ratio,
            latest_earnings: stats.latest_earnings,
        }
    }
}
