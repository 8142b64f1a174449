//! Error types for the market data crate.
//!
//! Every provider call returns [`MarketDataError`] on failure. The
//! [`ProviderRegistry`](crate::registry::ProviderRegistry) never lets these
//! escape: it records them as diagnostics and degrades the affected field to
//! "unavailable".

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The request to the provider did not finish within the upstream timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (bad status, unexpected payload,
    /// authentication failure).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered but the value could not be used
    /// (non-numeric price, NaN, missing field).
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Short machine-friendly label for diagnostics and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SymbolNotFound(_) => "symbol_not_found",
            Self::Timeout { .. } => "timeout",
            Self::ProviderError { .. } => "provider_error",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::Network(_) => "network",
        }
    }

    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
