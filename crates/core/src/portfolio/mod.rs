//! Portfolio module - snapshot building and the pipeline that feeds it.

mod portfolio_service;
mod portfolio_traits;
pub mod snapshot;

pub use portfolio_service::PortfolioService;
pub use portfolio_traits::PortfolioServiceTrait;
pub use snapshot::*;
