//! Request throttling for the public entry point.

mod rate_limiter;

pub use rate_limiter::{RateLimitConfig, RateLimiter};
