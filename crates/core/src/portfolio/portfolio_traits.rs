//! Portfolio service traits.

use async_trait::async_trait;

use super::snapshot::PortfolioSnapshot;
use crate::errors::Result;

/// Trait defining the contract for producing portfolio snapshots.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Load holdings, fetch live metrics for all of them and build a snapshot.
    ///
    /// Fails only when the holdings cannot be loaded (or there are none).
    /// Missing market data degrades individual fields instead.
    async fn get_snapshot(&self) -> Result<PortfolioSnapshot>;
}
