//! Provider attempt tracking for metrics fetch diagnostics.

use std::borrow::Cow;

use crate::errors::MarketDataError;
use crate::models::{MetricsKind, ProviderId};

/// Provider id recorded when a value was served from cache.
pub const CACHE_PROVIDER_ID: &str = "CACHE";

/// How a single provider attempt ended.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// The provider returned a usable value.
    Success,

    /// The provider answered but had nothing for this symbol.
    Empty,

    /// The provider failed (network, timeout, parse).
    Error { kind: &'static str, message: String },

    /// The value came from the cache without calling any provider.
    CacheHit,
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub metrics_kind: MetricsKind,
    pub outcome: AttemptOutcome,
}

/// Ordered record of the provider attempts made for one symbol.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    fn record(&mut self, provider_id: ProviderId, metrics_kind: MetricsKind, outcome: AttemptOutcome) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            metrics_kind,
            outcome,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId, metrics_kind: MetricsKind) {
        self.record(provider_id, metrics_kind, AttemptOutcome::Success);
    }

    pub fn record_empty(&mut self, provider_id: ProviderId, metrics_kind: MetricsKind) {
        self.record(provider_id, metrics_kind, AttemptOutcome::Empty);
    }

    pub fn record_error(
        &mut self,
        provider_id: ProviderId,
        metrics_kind: MetricsKind,
        error: &MarketDataError,
    ) {
        self.record(
            provider_id,
            metrics_kind,
            AttemptOutcome::Error {
                kind: error.kind(),
                message: error.to_string(),
            },
        );
    }

    pub fn record_cache_hit(&mut self, metrics_kind: MetricsKind) {
        self.record(
            Cow::Borrowed(CACHE_PROVIDER_ID),
            metrics_kind,
            AttemptOutcome::CacheHit,
        );
    }

    /// Append the attempts of another fetch, keeping their order.
    pub fn merge(&mut self, other: FetchDiagnostics) {
        self.attempts.extend(other.attempts);
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success => format!("{} {}: SUCCESS", a.provider_id, a.metrics_kind),
                AttemptOutcome::Empty => format!("{} {}: EMPTY", a.provider_id, a.metrics_kind),
                AttemptOutcome::Error { message, .. } => {
                    format!("{} {}: ERROR ({})", a.provider_id, a.metrics_kind, message)
                }
                AttemptOutcome::CacheHit => format!("{} {}: HIT", a.provider_id, a.metrics_kind),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any attempt produced a value (fresh or cached).
    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| matches!(a.outcome, AttemptOutcome::Success | AttemptOutcome::CacheHit))
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<(&ProviderId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Error { message, .. } => Some((&a.provider_id, message.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Render failed attempts as user-facing warnings for `symbol`.
    ///
    /// Format: `"<SYMBOL>: <PROVIDER> <kind> fetch failed: <message>"`.
    pub fn warnings(&self, symbol: &str) -> Vec<String> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Error { message, .. } => Some(format!(
                    "{}: {} {} fetch failed: {}",
                    symbol, a.provider_id, a.metrics_kind, message
                )),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_cache_hit(MetricsKind::Price);
        diag.record_empty(Cow::Borrowed("GOOGLE_FINANCE"), MetricsKind::Stats);
        diag.record_error(
            Cow::Borrowed("YAHOO"),
            MetricsKind::Stats,
            &MarketDataError::Timeout {
                provider: "YAHOO".to_string(),
            },
        );

        let summary = diag.summary();
        assert_eq!(
            summary,
            "CACHE price: HIT -> GOOGLE_FINANCE stats: EMPTY -> YAHOO stats: ERROR (Timeout: YAHOO)"
        );
    }

    #[test]
    fn test_has_success() {
        let mut diag = FetchDiagnostics::new();
        diag.record_empty(Cow::Borrowed("GOOGLE_FINANCE"), MetricsKind::Stats);
        assert!(!diag.has_success());

        diag.record_success(Cow::Borrowed("YAHOO"), MetricsKind::Stats);
        assert!(diag.has_success());
    }

    #[test]
    fn test_warnings_only_cover_errors() {
        let mut diag = FetchDiagnostics::new();
        diag.record_success(Cow::Borrowed("YAHOO"), MetricsKind::Price);
        diag.record_error(
            Cow::Borrowed("GOOGLE_FINANCE"),
            MetricsKind::Stats,
            &MarketDataError::provider("GOOGLE_FINANCE", "HTTP 503 from quote page"),
        );

        let warnings = diag.warnings("TCS");
        assert_eq!(
            warnings,
            vec![
                "TCS: GOOGLE_FINANCE stats fetch failed: Provider error: GOOGLE_FINANCE - HTTP 503 from quote page"
                    .to_string()
            ]
        );
        assert_eq!(diag.errors().len(), 1);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut price = FetchDiagnostics::new();
        price.record_success(Cow::Borrowed("YAHOO"), MetricsKind::Price);
        let mut stats = FetchDiagnostics::new();
        stats.record_cache_hit(MetricsKind::Stats);

        price.merge(stats);
        assert_eq!(price.attempts.len(), 2);
        assert_eq!(price.attempts[1].outcome, AttemptOutcome::CacheHit);
    }
}
