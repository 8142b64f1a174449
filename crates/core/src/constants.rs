/// Sector label used when a holding has none
pub const UNSPECIFIED_SECTOR: &str = "Unspecified";

/// Decimal precision for percentage calculations
pub const PERCENTAGE_PRECISION: u32 = 6;

/// Default number of holdings fetched concurrently
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;
