use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use pulsefolio_core::constants::DEFAULT_MAX_CONCURRENT_FETCHES;
use pulsefolio_core::RateLimitConfig;
use pulsefolio_market_data::RegistryConfig;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HOLDINGS_FILE: &str = "./holdings.csv";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub holdings_file: PathBuf,
    pub registry: RegistryConfig,
    pub max_concurrent_fetches: usize,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable lookup.
    ///
    /// Numeric values that fail to parse fall back to their defaults. An
    /// unparseable listen address is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr_raw =
            lookup("PULSE_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr_raw
            .parse()
            .with_context(|| format!("Invalid PULSE_LISTEN_ADDR: {}", listen_addr_raw))?;

        let cors_allow = lookup("PULSE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let holdings_file = lookup("PULSE_HOLDINGS_FILE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOLDINGS_FILE.into());

        let registry_defaults = RegistryConfig::default();
        let registry = RegistryConfig {
            price_ttl: millis_or(&lookup, "PULSE_PRICE_TTL_MS", registry_defaults.price_ttl),
            stats_ttl: millis_or(&lookup, "PULSE_STATS_TTL_MS", registry_defaults.stats_ttl),
            upstream_timeout: millis_or(
                &lookup,
                "PULSE_UPSTREAM_TIMEOUT_MS",
                registry_defaults.upstream_timeout,
            ),
        };

        let rate_defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            window: millis_or(&lookup, "PULSE_RATE_LIMIT_WINDOW_MS", rate_defaults.window),
            max_requests: parse_or(
                &lookup,
                "PULSE_RATE_LIMIT_MAX_REQUESTS",
                rate_defaults.max_requests,
            ),
            max_tracked_clients: parse_or(
                &lookup,
                "PULSE_RATE_LIMIT_MAX_CLIENTS",
                rate_defaults.max_tracked_clients,
            ),
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: millis_or(
                &lookup,
                "PULSE_REQUEST_TIMEOUT_MS",
                Duration::from_millis(30000),
            ),
            holdings_file: PathBuf::from(holdings_file),
            registry,
            max_concurrent_fetches: parse_or(
                &lookup,
                "PULSE_MAX_CONCURRENT_FETCHES",
                DEFAULT_MAX_CONCURRENT_FETCHES,
            ),
            rate_limit,
        })
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
