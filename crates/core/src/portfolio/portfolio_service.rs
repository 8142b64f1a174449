//! Portfolio service: the live snapshot pipeline.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info};

use pulsefolio_market_data::MetricsReport;

use super::portfolio_traits::PortfolioServiceTrait;
use super::snapshot::{build_portfolio_snapshot_with_errors, LiveMetricsLookup, PortfolioSnapshot};
use crate::constants::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::errors::{Error, Result};
use crate::holdings::{HoldingInput, HoldingsSource};
use crate::quotes::LiveMetricsServiceTrait;

/// Builds portfolio snapshots from a holdings source and a live metrics service.
pub struct PortfolioService {
    holdings_source: Arc<dyn HoldingsSource>,
    live_metrics_service: Arc<dyn LiveMetricsServiceTrait>,
    max_concurrent_fetches: usize,
}

impl PortfolioService {
    pub fn new(
        holdings_source: Arc<dyn HoldingsSource>,
        live_metrics_service: Arc<dyn LiveMetricsServiceTrait>,
    ) -> Self {
        Self {
            holdings_source,
            live_metrics_service,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Bound the number of holdings fetched at once (at least one).
    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// Fetch live metrics for every holding and collect fetch warnings.
    ///
    /// All fetches complete before this returns. Warnings follow holding order.
    async fn fetch_live_metrics(&self, holdings: &[HoldingInput]) -> (LiveMetricsLookup, Vec<String>) {
        let fetches: Vec<_> = holdings
            .iter()
            .enumerate()
            .map(|(index, holding)| {
                let service = Arc::clone(&self.live_metrics_service);
                let symbol = holding.particulars.clone();
                let exchange = holding.exchange_code;
                async move {
                    let report = service.fetch_live_metrics(&symbol, exchange).await;
                    (index, report)
                }
            })
            .collect();

        let mut reports: Vec<(usize, MetricsReport)> = stream::iter(fetches)
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        reports.sort_by_key(|(index, _)| *index);

        let mut lookup = LiveMetricsLookup::with_capacity(holdings.len());
        let mut warnings = Vec::new();

        for (index, report) in reports {
            let symbol = &holdings[index].particulars;
            warnings.extend(report.diagnostics.warnings(symbol));
            lookup.insert(symbol.clone(), report.metrics);
        }

        (lookup, warnings)
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_snapshot(&self) -> Result<PortfolioSnapshot> {
        let holdings = self.holdings_source.load_holdings().await?;
        if holdings.is_empty() {
            return Err(Error::HoldingsSource(
                "holdings source returned no holdings".to_string(),
            ));
        }

        let started = Instant::now();
        let (lookup, warnings) = self.fetch_live_metrics(&holdings).await;

        info!(
            "Fetched live metrics for {} holdings in {:?} ({} warnings)",
            holdings.len(),
            started.elapsed(),
            warnings.len()
        );
        for warning in &warnings {
            debug!("{}", warning);
        }

        Ok(build_portfolio_snapshot_with_errors(
            &holdings, &lookup, warnings,
        ))
    }
}
