//! Holdings module - portfolio positions and the sources they are loaded from.

mod holdings_model;
mod holdings_source;
mod holdings_traits;

pub use holdings_model::*;
pub use holdings_source::*;
pub use holdings_traits::*;

#[cfg(test)]
mod holdings_source_tests;
