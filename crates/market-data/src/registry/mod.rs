//! Provider registry module.
//!
//! This module provides orchestration for market data providers, including:
//! - Priority ordering of statistics providers with tiered fallback
//! - Per-kind TTL caching of prices and statistics
//! - Upstream timeouts
//! - Per-fetch diagnostics

mod diagnostics;
mod registry;

pub use diagnostics::{AttemptOutcome, FetchDiagnostics, ProviderAttempt, CACHE_PROVIDER_ID};
pub use registry::{
    MetricsReport, ProviderRegistry, RegistryConfig, DEFAULT_PRICE_TTL, DEFAULT_STATS_TTL,
    DEFAULT_UPSTREAM_TIMEOUT,
};
