//! Pure snapshot calculations: per-holding figures and sector aggregates.

use std::collections::HashMap;

use chrono::Utc;
use log::warn;
use rust_decimal::Decimal;

use pulsefolio_market_data::LiveMetrics;

use super::{HoldingComputed, PortfolioSnapshot, SectorSummary};
use crate::constants::PERCENTAGE_PRECISION;
use crate::holdings::{sector_label, HoldingInput};

/// Live metrics keyed by holding symbol (`particulars`).
pub type LiveMetricsLookup = HashMap<String, LiveMetrics>;

/// Value one holding against its live metrics.
///
/// When `cmp` is unavailable the purchase price stands in for it, so the
/// holding shows no gain or loss. A `cmp` whose market value does not fit in
/// a `Decimal` is dropped the same way. Returns `None` when the purchase
/// value itself does not fit.
pub fn compute_holding(
    holding: &HoldingInput,
    live: &LiveMetrics,
    total_investment: Decimal,
) -> Option<HoldingComputed> {
    let investment = holding.investment()?;
    let quantity = Decimal::from(holding.quantity);

    let mut live = live.clone();
    let market_value = live.cmp.and_then(|cmp| {
        let present_value = cmp.checked_mul(quantity)?;
        let gain_loss = present_value.checked_sub(investment)?;
        Some((present_value, gain_loss))
    });

    let (present_value, gain_loss) = match market_value {
        Some(values) => values,
        None => {
            if let Some(cmp) = live.cmp.take() {
                warn!(
                    "Live price {} for {} is out of range, valuing at purchase price",
                    cmp, holding.particulars
                );
            }
            (investment, Decimal::ZERO)
        }
    };

    Some(HoldingComputed {
        particulars: holding.particulars.clone(),
        purchase_price: holding.purchase_price,
        quantity: holding.quantity,
        exchange_code: holding.exchange_code,
        sector: holding.sector_label().to_string(),
        investment,
        portfolio_percentage: percentage_of(investment, total_investment),
        present_value,
        gain_loss,
        live,
    })
}

/// Build a snapshot with no fetch warnings attached.
pub fn build_portfolio_snapshot(
    holdings: &[HoldingInput],
    live_lookup: &LiveMetricsLookup,
) -> PortfolioSnapshot {
    build_portfolio_snapshot_with_errors(holdings, live_lookup, Vec::new())
}

/// Build a snapshot, attaching the non-fatal `errors` met while fetching.
///
/// Holdings missing from `live_lookup` are valued with all metrics absent.
/// Holdings whose purchase value cannot be represented are left out, and
/// live prices that cannot be used are replaced by the purchase price; both
/// are reported in `errors` after the fetch warnings.
pub fn build_portfolio_snapshot_with_errors(
    holdings: &[HoldingInput],
    live_lookup: &LiveMetricsLookup,
    mut errors: Vec<String>,
) -> PortfolioSnapshot {
    let (valued, total_investment) = representable_holdings(holdings, &mut errors);
    let unavailable = LiveMetrics::unavailable();

    let computed: Vec<HoldingComputed> = valued
        .into_iter()
        .filter_map(|holding| {
            let live = live_lookup.get(&holding.particulars).unwrap_or(&unavailable);
            let computed = compute_holding(holding, live, total_investment)?;
            if live.cmp.is_some() && computed.live.cmp.is_none() {
                errors.push(format!(
                    "{}: live price out of range, valued at purchase price",
                    holding.particulars
                ));
            }
            Some(computed)
        })
        .collect();

    let sectors = aggregate_by_sector(&computed);

    PortfolioSnapshot {
        holdings: computed,
        sectors,
        updated_at: Utc::now(),
        errors,
    }
}

/// Holdings whose purchase value, and the running portfolio total, fit in a
/// `Decimal`, together with that total. The rest are reported in `errors`.
fn representable_holdings<'a>(
    holdings: &'a [HoldingInput],
    errors: &mut Vec<String>,
) -> (Vec<&'a HoldingInput>, Decimal) {
    let mut kept = Vec::with_capacity(holdings.len());
    let mut total = Decimal::ZERO;

    for holding in holdings {
        match holding.investment().and_then(|value| total.checked_add(value)) {
            Some(next_total) => {
                total = next_total;
                kept.push(holding);
            }
            None => {
                warn!("Skipping {}: purchase value out of range", holding.particulars);
                errors.push(format!(
                    "{}: purchase value out of range, holding skipped",
                    holding.particulars
                ));
            }
        }
    }

    (kept, total)
}

/// Group computed holdings by sector.
///
/// Sectors are emitted in the order they first appear. Percentages are
/// shares of the grand total investment, all zero when that total is zero.
/// Totals that exceed the `Decimal` range are clamped.
pub fn aggregate_by_sector(computed: &[HoldingComputed]) -> Vec<SectorSummary> {
    let total_investment = computed
        .iter()
        .fold(Decimal::ZERO, |total, h| total.saturating_add(h.investment));

    let mut summaries: Vec<SectorSummary> = Vec::new();
    let mut index_by_sector: HashMap<String, usize> = HashMap::new();

    for holding in computed {
        let sector = sector_label(Some(&holding.sector));
        let index = *index_by_sector.entry(sector.to_string()).or_insert_with(|| {
            summaries.push(SectorSummary::empty(sector));
            summaries.len() - 1
        });

        let summary = &mut summaries[index];
        accumulate(&mut summary.total_investment, holding.investment, sector);
        accumulate(&mut summary.total_present_value, holding.present_value, sector);
        accumulate(&mut summary.total_gain_loss, holding.gain_loss, sector);
    }

    for summary in &mut summaries {
        summary.percentage = percentage_of(summary.total_investment, total_investment);
    }

    summaries
}

fn accumulate(total: &mut Decimal, value: Decimal, sector: &str) {
    *total = match total.checked_add(value) {
        Some(sum) => sum,
        None => {
            warn!("Sector '{}' total out of range, clamping", sector);
            total.saturating_add(value)
        }
    };
}

/// `part` as a percentage of `total`, zero when `total` is not positive.
fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(PERCENTAGE_PRECISION))
        .unwrap_or(Decimal::ZERO)
}
