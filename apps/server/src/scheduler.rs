//! Background sweeper for expired rate-limit counters.
//!
//! Runs once per rate-limit window so counters for clients that went quiet
//! do not accumulate.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;
use pulsefolio_core::RateLimiter;

/// Floor for the sweep period, for very short windows.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Starts the background rate-limit sweeper.
pub fn start_rate_limit_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let limiter = state.rate_limiter.clone();
    let period = limiter.config().window.max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        info!("Rate-limit sweeper started ({:?} interval)", period);

        let mut sweep_interval = interval(period);
        sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        sweep_interval.tick().await;

        loop {
            sweep_interval.tick().await;
            run_sweep(&limiter);
        }
    })
}

fn run_sweep(limiter: &RateLimiter) {
    let removed = limiter.sweep_expired();
    if removed > 0 {
        debug!(
            "Swept {} expired rate-limit counters, {} still tracked",
            removed,
            limiter.tracked_clients()
        );
    }
}
