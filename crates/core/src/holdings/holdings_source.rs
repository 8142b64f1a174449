//! Holdings sources: the built-in list and a CSV file loader.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use csv::StringRecord;
use log::{debug, info, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::OnceCell;

use pulsefolio_market_data::{canonical_symbol, ExchangeCode};

use super::{HoldingInput, HoldingsSource};
use crate::constants::UNSPECIFIED_SECTOR;
use crate::errors::Result;

const SYMBOL_COLUMNS: &[&str] = &["particulars", "Particulars", "Stock", "Name"];
const PRICE_COLUMNS: &[&str] = &["purchasePrice", "PurchasePrice", "buy_price"];
const QUANTITY_COLUMNS: &[&str] = &["quantity", "Quantity", "qty"];
const EXCHANGE_COLUMNS: &[&str] = &["exchangeCode", "Exchange", "ExchangeCode"];
const SECTOR_COLUMNS: &[&str] = &["sector", "Sector"];

/// The built-in holdings used when no external source is usable.
pub fn default_holdings() -> Vec<HoldingInput> {
    vec![
        HoldingInput::new("TCS", dec!(3600), 12, ExchangeCode::Nse).with_sector("IT Services"),
        HoldingInput::new("RELIANCE", dec!(2450), 20, ExchangeCode::Nse).with_sector("Energy"),
        HoldingInput::new("HDFCBANK", dec!(1470), 30, ExchangeCode::Nse).with_sector("Banking"),
        HoldingInput::new("LT", dec!(3650), 8, ExchangeCode::Nse).with_sector("Infrastructure"),
    ]
}

/// Holdings source that always returns a fixed list.
#[derive(Debug, Clone)]
pub struct StaticHoldingsSource {
    holdings: Vec<HoldingInput>,
}

impl StaticHoldingsSource {
    pub fn new(holdings: Vec<HoldingInput>) -> Self {
        Self { holdings }
    }
}

impl Default for StaticHoldingsSource {
    fn default() -> Self {
        Self::new(default_holdings())
    }
}

#[async_trait]
impl HoldingsSource for StaticHoldingsSource {
    async fn load_holdings(&self) -> Result<Vec<HoldingInput>> {
        Ok(self.holdings.clone())
    }
}

/// Holdings source backed by a CSV file.
///
/// The file is read once, on first use, and the result is kept for the
/// lifetime of the source. A missing file, an unreadable file or a file
/// without a single usable row yields the built-in holdings instead.
pub struct CsvHoldingsSource {
    path: PathBuf,
    holdings: OnceCell<Vec<HoldingInput>>,
}

impl CsvHoldingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            holdings: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_or_fallback(&self) -> Vec<HoldingInput> {
        if !self.path.exists() {
            info!(
                "Holdings file {} not found, using built-in holdings",
                self.path.display()
            );
            return default_holdings();
        }

        match read_holdings_csv(&self.path) {
            Ok(holdings) if !holdings.is_empty() => {
                info!(
                    "Loaded {} holdings from {}",
                    holdings.len(),
                    self.path.display()
                );
                holdings
            }
            Ok(_) => {
                warn!(
                    "Holdings file {} has no usable rows, using built-in holdings",
                    self.path.display()
                );
                default_holdings()
            }
            Err(e) => {
                warn!(
                    "Failed to parse holdings file {}, using built-in holdings: {}",
                    self.path.display(),
                    e
                );
                default_holdings()
            }
        }
    }
}

#[async_trait]
impl HoldingsSource for CsvHoldingsSource {
    async fn load_holdings(&self) -> Result<Vec<HoldingInput>> {
        let holdings = self
            .holdings
            .get_or_init(|| async { self.load_or_fallback() })
            .await;
        Ok(holdings.clone())
    }
}

/// Read every usable row of a holdings CSV file.
///
/// Rows missing a symbol, price or quantity, carrying a non-positive price
/// or quantity, or whose `price × quantity` overflows, are skipped.
pub fn read_holdings_csv(path: &Path) -> Result<Vec<HoldingInput>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut holdings = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        match holding_from_record(&headers, &record) {
            Some(holding) => holdings.push(holding),
            // Header is line 1
            None => debug!("Skipping holdings row {}: missing or invalid fields", index + 2),
        }
    }

    Ok(holdings)
}

fn holding_from_record(headers: &StringRecord, record: &StringRecord) -> Option<HoldingInput> {
    let particulars = canonical_symbol(first_value(headers, record, SYMBOL_COLUMNS)?);
    if particulars.is_empty() {
        return None;
    }

    let purchase_price = purchase_price(headers, record)?;
    let quantity = quantity(headers, record)?;

    let exchange_code = first_value(headers, record, EXCHANGE_COLUMNS)
        .map(ExchangeCode::from_code)
        .unwrap_or_default();

    let sector = first_value(headers, record, SECTOR_COLUMNS)
        .map(str::to_string)
        .unwrap_or_else(|| infer_sector(&particulars).to_string());

    let holding =
        HoldingInput::new(particulars, purchase_price, quantity, exchange_code).with_sector(sector);
    // Positions whose purchase value cannot be represented are unusable
    holding.investment()?;
    Some(holding)
}

fn purchase_price(headers: &StringRecord, record: &StringRecord) -> Option<Decimal> {
    PRICE_COLUMNS
        .iter()
        .find_map(|column| value(headers, record, column).and_then(parse_decimal))
        .filter(|price| *price > Decimal::ZERO)
}

fn quantity(headers: &StringRecord, record: &StringRecord) -> Option<u32> {
    QUANTITY_COLUMNS
        .iter()
        .find_map(|column| value(headers, record, column).and_then(parse_decimal))
        .filter(|qty| *qty > Decimal::ZERO && qty.fract().is_zero())
        .and_then(|qty| qty.to_u32())
}

/// Value of the first alias column that is present and non-empty.
fn first_value<'r>(
    headers: &StringRecord,
    record: &'r StringRecord,
    columns: &[&str],
) -> Option<&'r str> {
    columns
        .iter()
        .find_map(|column| value(headers, record, column))
}

fn value<'r>(headers: &StringRecord, record: &'r StringRecord, column: &str) -> Option<&'r str> {
    let index = headers.iter().position(|h| h == column)?;
    record.get(index).filter(|v| !v.is_empty())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).ok()
}

/// Guess a sector from the (uppercased) ticker when the file has none.
pub fn infer_sector(symbol: &str) -> &'static str {
    if symbol.contains("BANK") {
        "Banking"
    } else if symbol.contains("STEEL") || symbol.contains("IND") {
        "Manufacturing"
    } else if symbol.contains("PHAR") {
        "Pharma"
    } else if symbol.contains("TECH") || symbol.contains("INF") || symbol.contains("TCS") {
        "IT Services"
    } else {
        UNSPECIFIED_SECTOR
    }
}
