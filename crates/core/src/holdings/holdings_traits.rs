//! Holdings source trait.

use async_trait::async_trait;

use super::HoldingInput;
use crate::errors::Result;

/// Supplier of the holdings a snapshot is built from.
///
/// Implementations return holdings in display order. An empty list is a
/// valid answer from the source's point of view; the portfolio service
/// decides whether it can work with it.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    async fn load_holdings(&self) -> Result<Vec<HoldingInput>>;
}
