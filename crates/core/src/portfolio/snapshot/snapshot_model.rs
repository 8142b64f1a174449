//! Portfolio snapshot domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pulsefolio_market_data::{ExchangeCode, LiveMetrics};

/// A holding merged with the live metrics used to value it.
///
/// Invariant: `investment + gain_loss == present_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingComputed {
    pub particulars: String,
    pub purchase_price: Decimal,
    pub quantity: u32,
    pub exchange_code: ExchangeCode,
    /// Sector label, "Unspecified" when the holding had none
    pub sector: String,
    /// purchase_price × quantity
    pub investment: Decimal,
    /// Share of total portfolio investment (0-100)
    pub portfolio_percentage: Decimal,
    /// cmp × quantity, or the investment when cmp is unavailable
    pub present_value: Decimal,
    pub gain_loss: Decimal,
    pub live: LiveMetrics,
}

/// Totals for every holding sharing a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    pub total_investment: Decimal,
    pub total_present_value: Decimal,
    pub total_gain_loss: Decimal,
    /// Share of total portfolio investment (0-100)
    pub percentage: Decimal,
}

impl SectorSummary {
    pub(crate) fn empty(sector: &str) -> Self {
        Self {
            sector: sector.to_string(),
            total_investment: Decimal::ZERO,
            total_present_value: Decimal::ZERO,
            total_gain_loss: Decimal::ZERO,
            percentage: Decimal::ZERO,
        }
    }
}

/// Fully computed, timestamped view of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Holdings in the order the source supplied them
    pub holdings: Vec<HoldingComputed>,
    /// One entry per distinct sector, in first-appearance order
    pub sectors: Vec<SectorSummary>,
    pub updated_at: DateTime<Utc>,
    /// Non-fatal problems met while fetching live metrics
    pub errors: Vec<String>,
}

impl PortfolioSnapshot {
    /// Sum of investment across holdings.
    pub fn total_investment(&self) -> Decimal {
        self.holdings
            .iter()
            .fold(Decimal::ZERO, |total, h| total.saturating_add(h.investment))
    }

    /// Sum of present value across holdings.
    pub fn total_present_value(&self) -> Decimal {
        self.holdings
            .iter()
            .fold(Decimal::ZERO, |total, h| total.saturating_add(h.present_value))
    }

    /// Sum of gain/loss across holdings.
    pub fn total_gain_loss(&self) -> Decimal {
        self.holdings
            .iter()
            .fold(Decimal::ZERO, |total, h| total.saturating_add(h.gain_loss))
    }
}
