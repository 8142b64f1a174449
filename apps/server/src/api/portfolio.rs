use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use pulsefolio_core::PortfolioSnapshot;
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Identity used when a request carries no forwarding headers.
pub const ANONYMOUS_CLIENT: &str = "anon";

#[derive(Serialize)]
pub struct SnapshotEnvelope {
    pub data: PortfolioSnapshot,
}

/// Caller identity for rate limiting.
///
/// The first non-empty entry of `x-forwarded-for`, else `x-real-ip`, else
/// [`ANONYMOUS_CLIENT`].
pub fn client_identity(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SnapshotEnvelope>> {
    let client_id = client_identity(&headers);
    if !state.rate_limiter.allow(&client_id) {
        tracing::warn!("Rate limit exceeded for client {}", client_id);
        return Err(ApiError::TooManyRequests);
    }

    let snapshot = state.portfolio_service.get_snapshot().await?;
    if !snapshot.errors.is_empty() {
        tracing::warn!(
            "Snapshot built with {} market data warnings",
            snapshot.errors.len()
        );
    }
    Ok(Json(SnapshotEnvelope { data: snapshot }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio", get(get_portfolio))
}
