//! Portfolio snapshot module - holding valuation and sector aggregation.

mod snapshot_calculator;
mod snapshot_model;

pub use snapshot_calculator::*;
pub use snapshot_model::*;
