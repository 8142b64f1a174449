//! Provider registry: the live metrics chain.
//!
//! The registry owns the providers and the per-kind caches, and turns a
//! `(symbol, exchange)` pair into [`LiveMetrics`]:
//! - Price and statistics are fetched concurrently
//! - Each kind consults its own TTL cache first
//! - Statistics providers are tried in priority order until one yields a value
//! - Every provider call is bounded by the upstream timeout
//!
//! Provider failures never escape. They are logged, recorded in
//! [`FetchDiagnostics`] and the affected field is reported as absent.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::diagnostics::FetchDiagnostics;
use crate::cache::TtlCache;
use crate::errors::MarketDataError;
use crate::models::{canonical_symbol, ExchangeCode, LiveMetrics, MetricsKind, ProviderId, ValuationStats};
use crate::provider::google_finance::GoogleFinanceProvider;
use crate::provider::yahoo::YahooProvider;
use crate::provider::{QuoteProvider, StatsProvider};

/// Default lifetime of a cached price.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(12);

/// Default lifetime of cached valuation statistics.
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(5 * 60);

/// Default bound on a single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(7);

/// Cache and timeout settings for a [`ProviderRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    pub price_ttl: Duration,
    pub stats_ttl: Duration,
    pub upstream_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            price_ttl: DEFAULT_PRICE_TTL,
            stats_ttl: DEFAULT_STATS_TTL,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Live metrics for one symbol together with how they were obtained.
#[derive(Clone, Debug, Default)]
pub struct MetricsReport {
    pub metrics: LiveMetrics,
    pub diagnostics: FetchDiagnostics,
}

/// Provider registry for fetching live metrics.
pub struct ProviderRegistry {
    quote_provider: Arc<dyn QuoteProvider>,
    stats_providers: Vec<Arc<dyn StatsProvider>>,
    price_cache: TtlCache<Decimal>,
    stats_cache: TtlCache<ValuationStats>,
    upstream_timeout: Duration,
}

impl ProviderRegistry {
    /// Create a registry from explicit providers.
    ///
    /// Stats providers are ordered by [`StatsProvider::priority`] (lower first);
    /// providers with equal priority keep their given order.
    pub fn new(
        quote_provider: Arc<dyn QuoteProvider>,
        mut stats_providers: Vec<Arc<dyn StatsProvider>>,
        config: RegistryConfig,
    ) -> Self {
        stats_providers.sort_by_key(|p| p.priority());

        Self {
            quote_provider,
            stats_providers,
            price_cache: TtlCache::new(config.price_ttl),
            stats_cache: TtlCache::new(config.stats_ttl),
            upstream_timeout: config.upstream_timeout,
        }
    }

    /// Create the production chain: Yahoo for prices, Google Finance then
    /// Yahoo for statistics.
    pub fn with_default_providers(config: RegistryConfig) -> Result<Self, MarketDataError> {
        let yahoo = Arc::new(YahooProvider::new(config.upstream_timeout)?);
        let google = Arc::new(GoogleFinanceProvider::new(config.upstream_timeout)?);

        info!(
            "Market data chain ready (price TTL {:?}, stats TTL {:?}, upstream timeout {:?})",
            config.price_ttl, config.stats_ttl, config.upstream_timeout
        );

        let stats_providers: Vec<Arc<dyn StatsProvider>> = vec![google, yahoo.clone()];
        Ok(Self::new(yahoo, stats_providers, config))
    }

    /// Fetch price and statistics for one symbol concurrently.
    pub async fn fetch_live_metrics(&self, symbol: &str, exchange: ExchangeCode) -> MetricsReport {
        let mut price_diagnostics = FetchDiagnostics::new();
        let mut stats_diagnostics = FetchDiagnostics::new();

        let (cmp, stats) = tokio::join!(
            self.fetch_price(symbol, exchange, &mut price_diagnostics),
            self.fetch_stats(symbol, exchange, &mut stats_diagnostics),
        );

        price_diagnostics.merge(stats_diagnostics);
        debug!(
            "Live metrics for {}:{} -> {}",
            symbol,
            exchange,
            price_diagnostics.summary()
        );

        MetricsReport {
            metrics: LiveMetrics::from_parts(cmp, stats),
            diagnostics: price_diagnostics,
        }
    }

    /// Fetch the current market price, or `None` when it is unavailable.
    pub async fn fetch_price(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
        diagnostics: &mut FetchDiagnostics,
    ) -> Option<Decimal> {
        let key = cache_key(MetricsKind::Price, symbol, exchange);
        if let Some(price) = self.price_cache.get(&key) {
            diagnostics.record_cache_hit(MetricsKind::Price);
            return Some(price);
        }

        let provider_id: ProviderId = Cow::Borrowed(self.quote_provider.id());
        let result = self
            .with_timeout(
                &provider_id,
                self.quote_provider.latest_price(symbol, exchange),
            )
            .await;

        match result {
            Ok(price) => {
                diagnostics.record_success(provider_id, MetricsKind::Price);
                self.price_cache.set(key, price);
                Some(price)
            }
            Err(e) => {
                warn!(
                    "Price fetch failed for {}:{} from '{}': {}",
                    symbol, exchange, provider_id, e
                );
                diagnostics.record_error(provider_id, MetricsKind::Price, &e);
                None
            }
        }
    }

    /// Fetch valuation statistics, walking the stats providers in order.
    ///
    /// The first provider returning any value wins and its answer is cached.
    /// When every provider is empty or fails, all-absent stats are returned
    /// and nothing is cached.
    pub async fn fetch_stats(
        &self,
        symbol: &str,
        exchange: ExchangeCode,
        diagnostics: &mut FetchDiagnostics,
    ) -> ValuationStats {
        let key = cache_key(MetricsKind::Stats, symbol, exchange);
        if let Some(stats) = self.stats_cache.get(&key) {
            diagnostics.record_cache_hit(MetricsKind::Stats);
            return stats;
        }

        for provider in &self.stats_providers {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            let result = self
                .with_timeout(&provider_id, provider.valuation_stats(symbol, exchange))
                .await;

            match result {
                Ok(stats) if !stats.is_empty() => {
                    diagnostics.record_success(provider_id, MetricsKind::Stats);
                    self.stats_cache.set(key, stats.clone());
                    return stats;
                }
                Ok(_) => {
                    debug!(
                        "Provider '{}' had no stats for {}:{}, trying next",
                        provider_id, symbol, exchange
                    );
                    diagnostics.record_empty(provider_id, MetricsKind::Stats);
                }
                Err(e) => {
                    warn!(
                        "Stats fetch failed for {}:{} from '{}': {}",
                        symbol, exchange, provider_id, e
                    );
                    diagnostics.record_error(provider_id, MetricsKind::Stats, &e);
                }
            }
        }

        ValuationStats::default()
    }

    /// Run a provider call, mapping an elapsed upstream timeout to
    /// [`MarketDataError::Timeout`].
    async fn with_timeout<T, F>(&self, provider_id: &ProviderId, call: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: provider_id.to_string(),
            }),
        }
    }

    /// Ids of the stats providers in the order they are tried.
    pub fn stats_provider_ids(&self) -> Vec<&'static str> {
        self.stats_providers.iter().map(|p| p.id()).collect()
    }

    /// Configured upstream timeout.
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }
}

/// Cache key for one kind of data, e.g. `cmp:TCS:NSE`.
fn cache_key(kind: MetricsKind, symbol: &str, exchange: ExchangeCode) -> String {
    format!(
        "{}:{}:{}",
        kind.cache_prefix(),
        canonical_symbol(symbol),
        exchange
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AttemptOutcome;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockQuoteProvider {
        price: Option<Decimal>,
        delay: Duration,
        call_count: AtomicUsize,
    }

    impl MockQuoteProvider {
        fn new(price: Option<Decimal>) -> Self {
            Self {
                price,
                delay: Duration::ZERO,
                call_count: AtomicUsize::new(0),
            }
        }

        fn slow(price: Decimal, delay: Duration) -> Self {
            Self {
                price: Some(price),
                delay,
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteProvider for MockQuoteProvider {
        fn id(&self) -> &'static str {
            "MOCK_QUOTES"
        }

        async fn latest_price(
            &self,
            _symbol: &str,
            _exchange: ExchangeCode,
        ) -> Result<Decimal, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.price
                .ok_or_else(|| MarketDataError::SymbolNotFound("MOCK".to_string()))
        }
    }

    enum StatsBehavior {
        Returns(ValuationStats),
        Fails,
    }

    struct MockStatsProvider {
        id: &'static str,
        priority: u8,
        behavior: StatsBehavior,
        delay: Duration,
        call_count: AtomicUsize,
    }

    impl MockStatsProvider {
        fn new(id: &'static str, priority: u8, behavior: StatsBehavior) -> Self {
            Self {
                id,
                priority,
                behavior,
                delay: Duration::ZERO,
                call_count: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatsProvider for MockStatsProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn valuation_stats(
            &self,
            _symbol: &str,
            _exchange: ExchangeCode,
        ) -> Result<ValuationStats, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.behavior {
                StatsBehavior::Returns(stats) => Ok(stats.clone()),
                StatsBehavior::Fails => Err(MarketDataError::provider(self.id, "Mock failure")),
            }
        }
    }

    fn stats(pe: Option<Decimal>, earnings: Option<&str>) -> ValuationStats {
        ValuationStats {
            pe_ratio: pe,
            latest_earnings: earnings.map(str::to_string),
        }
    }

    fn registry(
        quote: Arc<MockQuoteProvider>,
        stats_providers: Vec<Arc<MockStatsProvider>>,
    ) -> ProviderRegistry {
        let stats_providers = stats_providers
            .into_iter()
            .map(|p| p as Arc<dyn StatsProvider>)
            .collect();
        ProviderRegistry::new(quote, stats_providers, RegistryConfig::default())
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(MetricsKind::Price, "tcs", ExchangeCode::Nse), "cmp:TCS:NSE");
        assert_eq!(
            cache_key(MetricsKind::Stats, "RELIANCE", ExchangeCode::Bse),
            "stats:RELIANCE:BSE"
        );
    }

    #[test]
    fn test_stats_providers_ordered_by_priority() {
        let secondary = Arc::new(MockStatsProvider::new("SECONDARY", 2, StatsBehavior::Fails));
        let primary = Arc::new(MockStatsProvider::new("PRIMARY", 1, StatsBehavior::Fails));

        let registry = registry(Arc::new(MockQuoteProvider::new(None)), vec![secondary, primary]);
        assert_eq!(registry.stats_provider_ids(), vec!["PRIMARY", "SECONDARY"]);
    }

    #[tokio::test]
    async fn test_primary_stats_short_circuit() {
        let primary = Arc::new(MockStatsProvider::new(
            "PRIMARY",
            1,
            StatsBehavior::Returns(stats(Some(dec!(29.4)), Some("128.55"))),
        ));
        let secondary = Arc::new(MockStatsProvider::new(
            "SECONDARY",
            2,
            StatsBehavior::Returns(stats(Some(dec!(31)), None)),
        ));

        let registry = registry(
            Arc::new(MockQuoteProvider::new(Some(dec!(3700)))),
            vec![primary.clone(), secondary.clone()],
        );
        let report = registry.fetch_live_metrics("TCS", ExchangeCode::Nse).await;

        assert_eq!(report.metrics.cmp, Some(dec!(3700)));
        assert_eq!(report.metrics.pe_ratio, Some(dec!(29.4)));
        assert_eq!(report.metrics.latest_earnings, Some("128.55".to_string()));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back_to_secondary() {
        let primary = Arc::new(MockStatsProvider::new(
            "PRIMARY",
            1,
            StatsBehavior::Returns(ValuationStats::default()),
        ));
        let secondary = Arc::new(MockStatsProvider::new(
            "SECONDARY",
            2,
            StatsBehavior::Returns(stats(Some(dec!(25.1)), None)),
        ));

        let registry = registry(
            Arc::new(MockQuoteProvider::new(Some(dec!(2450)))),
            vec![primary.clone(), secondary.clone()],
        );
        let report = registry.fetch_live_metrics("RELIANCE", ExchangeCode::Nse).await;

        assert_eq!(report.metrics.pe_ratio, Some(dec!(25.1)));
        assert_eq!(report.metrics.latest_earnings, None);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert!(report.diagnostics.errors().is_empty());
    }

    #[tokio::test]
    async fn test_failing_primary_falls_back_to_secondary() {
        let primary = Arc::new(MockStatsProvider::new("PRIMARY", 1, StatsBehavior::Fails));
        let secondary = Arc::new(MockStatsProvider::new(
            "SECONDARY",
            2,
            StatsBehavior::Returns(stats(None, Some("2024-03-31"))),
        ));

        let registry = registry(
            Arc::new(MockQuoteProvider::new(Some(dec!(1470)))),
            vec![primary, secondary],
        );
        let report = registry.fetch_live_metrics("HDFCBANK", ExchangeCode::Nse).await;

        assert_eq!(report.metrics.latest_earnings, Some("2024-03-31".to_string()));
        assert_eq!(
            report.diagnostics.warnings("HDFCBANK"),
            vec!["HDFCBANK: PRIMARY stats fetch failed: Provider error: PRIMARY - Mock failure".to_string()]
        );
    }

    #[tokio::test]
    async fn test_everything_fails_yields_unavailable_metrics() {
        let primary = Arc::new(MockStatsProvider::new("PRIMARY", 1, StatsBehavior::Fails));
        let secondary = Arc::new(MockStatsProvider::new("SECONDARY", 2, StatsBehavior::Fails));

        let registry = registry(Arc::new(MockQuoteProvider::new(None)), vec![primary, secondary]);
        let report = registry.fetch_live_metrics("LT", ExchangeCode::Bse).await;

        assert_eq!(report.metrics, LiveMetrics::unavailable());
        assert_eq!(report.diagnostics.errors().len(), 3);
        assert!(!report.diagnostics.has_success());
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let quote = Arc::new(MockQuoteProvider::new(Some(dec!(3650))));
        let primary = Arc::new(MockStatsProvider::new(
            "PRIMARY",
            1,
            StatsBehavior::Returns(stats(Some(dec!(35.2)), None)),
        ));

        let registry = registry(quote.clone(), vec![primary.clone()]);
        registry.fetch_live_metrics("LT", ExchangeCode::Nse).await;
        let report = registry.fetch_live_metrics("lt", ExchangeCode::Nse).await;

        assert_eq!(report.metrics.cmp, Some(dec!(3650)));
        assert_eq!(report.metrics.pe_ratio, Some(dec!(35.2)));
        assert_eq!(quote.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(primary.calls(), 1);
        assert!(report
            .diagnostics
            .attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::CacheHit));
    }

    #[tokio::test]
    async fn test_exchange_is_part_of_cache_key() {
        let quote = Arc::new(MockQuoteProvider::new(Some(dec!(100))));
        let registry = registry(quote.clone(), vec![]);

        let mut diagnostics = FetchDiagnostics::new();
        registry.fetch_price("TCS", ExchangeCode::Nse, &mut diagnostics).await;
        registry.fetch_price("TCS", ExchangeCode::Bse, &mut diagnostics).await;

        assert_eq!(quote.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_stats_are_not_cached() {
        let primary = Arc::new(MockStatsProvider::new(
            "PRIMARY",
            1,
            StatsBehavior::Returns(ValuationStats::default()),
        ));

        let registry = registry(Arc::new(MockQuoteProvider::new(None)), vec![primary.clone()]);
        let mut diagnostics = FetchDiagnostics::new();
        registry.fetch_stats("TCS", ExchangeCode::Nse, &mut diagnostics).await;
        registry.fetch_stats("TCS", ExchangeCode::Nse, &mut diagnostics).await;

        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let quote = Arc::new(MockQuoteProvider::slow(dec!(3600), Duration::from_millis(500)));
        let registry = ProviderRegistry::new(
            quote,
            Vec::new(),
            RegistryConfig {
                upstream_timeout: Duration::from_millis(20),
                ..RegistryConfig::default()
            },
        );

        let mut diagnostics = FetchDiagnostics::new();
        let price = registry.fetch_price("TCS", ExchangeCode::Nse, &mut diagnostics).await;

        assert_eq!(price, None);
        assert!(matches!(
            &diagnostics.attempts[0].outcome,
            AttemptOutcome::Error { kind: "timeout", .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_primary_stats_falls_back_to_secondary() {
        let primary = Arc::new(
            MockStatsProvider::new(
                "PRIMARY",
                1,
                StatsBehavior::Returns(stats(Some(dec!(29.4)), None)),
            )
            .with_delay(Duration::from_secs(10)),
        );
        let secondary = Arc::new(MockStatsProvider::new(
            "SECONDARY",
            2,
            StatsBehavior::Returns(stats(Some(dec!(31)), Some("2024-03-31"))),
        ));
        let stats_providers: Vec<Arc<dyn StatsProvider>> = vec![primary.clone(), secondary.clone()];
        let registry = ProviderRegistry::new(
            Arc::new(MockQuoteProvider::new(Some(dec!(3700)))),
            stats_providers,
            RegistryConfig::default(),
        );

        let report = registry.fetch_live_metrics("TCS", ExchangeCode::Nse).await;

        assert_eq!(report.metrics.pe_ratio, Some(dec!(31)));
        assert_eq!(report.metrics.latest_earnings, Some("2024-03-31".to_string()));
        assert_eq!(secondary.calls(), 1);

        let primary_attempt = report
            .diagnostics
            .attempts
            .iter()
            .find(|a| a.provider_id == "PRIMARY")
            .unwrap();
        assert!(matches!(
            &primary_attempt.outcome,
            AttemptOutcome::Error { kind: "timeout", .. }
        ));
        assert_eq!(
            report.diagnostics.warnings("TCS"),
            vec!["TCS: PRIMARY stats fetch failed: Timeout: PRIMARY".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_and_stats_fetched_concurrently() {
        let quote = Arc::new(MockQuoteProvider::slow(dec!(2450), Duration::from_millis(300)));
        let primary = Arc::new(
            MockStatsProvider::new(
                "PRIMARY",
                1,
                StatsBehavior::Returns(stats(Some(dec!(25.1)), None)),
            )
            .with_delay(Duration::from_millis(300)),
        );
        let registry = registry(quote, vec![primary]);

        let started = tokio::time::Instant::now();
        let report = registry.fetch_live_metrics("RELIANCE", ExchangeCode::Nse).await;
        let elapsed = started.elapsed();

        assert_eq!(report.metrics.cmp, Some(dec!(2450)));
        assert_eq!(report.metrics.pe_ratio, Some(dec!(25.1)));
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(600), "took {:?}", elapsed);
    }
}
