//! Fixed-window rate limiter keyed by client identity.
//!
//! Each client gets a counter and a window start. The first request of a
//! window resets the counter to one; further requests are allowed while the
//! counter is below the limit. Counters are bounded: expired windows can be
//! swept, and the map never grows past `max_tracked_clients`.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

/// Default length of a rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 60;

/// Default bound on the number of tracked clients.
pub const DEFAULT_MAX_TRACKED_CLIENTS: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            max_tracked_clients: DEFAULT_MAX_TRACKED_CLIENTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

impl WindowCounter {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }
}

/// Per-client fixed-window request counter.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    counters: DashMap<String, WindowCounter>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a request from `client_id` and report whether it is allowed.
    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        if !self.counters.contains_key(client_id)
            && self.counters.len() >= self.config.max_tracked_clients
        {
            self.make_room(now);
        }

        let mut counter = self
            .counters
            .entry(client_id.to_string())
            .or_insert(WindowCounter {
                count: 0,
                window_start: now,
            });

        if counter.count == 0 || counter.is_expired(now, self.config.window) {
            counter.count = 1;
            counter.window_start = now;
            return true;
        }

        if counter.count >= self.config.max_requests {
            return false;
        }

        counter.count += 1;
        true
    }

    /// Drop every counter whose window has elapsed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.counters.len();
        let window = self.config.window;
        self.counters
            .retain(|_, counter| !counter.is_expired(now, window));
        let removed = before.saturating_sub(self.counters.len());
        if removed > 0 {
            debug!("Swept {} expired rate-limit counters", removed);
        }
        removed
    }

    /// Free a slot for a new client: sweep expired counters, then drop the
    /// oldest window if the map is still full.
    fn make_room(&self, now: Instant) {
        self.sweep_expired_at(now);

        if self.counters.len() < self.config.max_tracked_clients {
            return;
        }

        let oldest = self
            .counters
            .iter()
            .min_by_key(|entry| entry.value().window_start)
            .map(|entry| entry.key().clone());

        if let Some(client_id) = oldest {
            debug!("Rate-limit map full, evicting counter for '{}'", client_id);
            self.counters.remove(&client_id);
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.counters.len()
    }

    /// Requests counted for `client_id` in its current window.
    pub fn request_count(&self, client_id: &str) -> Option<u32> {
        self.counters.get(client_id).map(|counter| counter.count)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
