use std::sync::Arc;

use axum::{routing::get, Router};

use crate::main_lib::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(healthz))
}
