//! In-memory caches for fetched market data.

mod ttl_cache;

pub use ttl_cache::TtlCache;
