use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pulsefolio_market_data::ExchangeCode;

use crate::constants::UNSPECIFIED_SECTOR;

/// One portfolio position as supplied by a holdings source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    /// Ticker symbol, without any venue suffix
    pub particulars: String,
    pub purchase_price: Decimal,
    pub quantity: u32,
    pub exchange_code: ExchangeCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl HoldingInput {
    pub fn new(
        particulars: impl Into<String>,
        purchase_price: Decimal,
        quantity: u32,
        exchange_code: ExchangeCode,
    ) -> Self {
        Self {
            particulars: particulars.into(),
            purchase_price,
            quantity,
            exchange_code,
            sector: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Amount paid for the position (`purchase_price × quantity`), or `None`
    /// when the product does not fit in a `Decimal`.
    pub fn investment(&self) -> Option<Decimal> {
        self.purchase_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Sector label for grouping. Missing or blank sectors become "Unspecified".
    pub fn sector_label(&self) -> &str {
        sector_label(self.sector.as_deref())
    }
}

/// Normalize an optional sector name for grouping.
pub fn sector_label(sector: Option<&str>) -> &str {
    match sector.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => UNSPECIFIED_SECTOR,
    }
}
