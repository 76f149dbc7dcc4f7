//! Rate limiter tuning.

use std::time::Duration;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Minimum spacing between requests to one domain.
    pub base_delay: Duration,
    /// Floor when recovering from backoff.
    pub min_delay: Duration,
    /// Ceiling for backoff.
    pub max_delay: Duration,
    /// Delay multiplier on 429/503.
    pub backoff_multiplier: f64,
    /// Delay multiplier applied on recovery.
    pub recovery_multiplier: f64,
    /// Consecutive successes before the delay is reduced.
    pub recovery_threshold: u32,
    /// Bounds of the jittered pause between dependent fetches in a job.
    pub pause_min: Duration,
    pub pause_max: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            recovery_multiplier: 0.5,
            recovery_threshold: 5,
            pause_min: Duration::from_millis(300),
            pause_max: Duration::from_millis(500),
        }
    }
}

impl RateLimitConfig {
    /// Config with pauses taken from application settings.
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            pause_min: Duration::from_millis(settings.pause_min_ms),
            pause_max: Duration::from_millis(settings.pause_max_ms.max(settings.pause_min_ms)),
            ..Default::default()
        }
    }

    /// No pauses or spacing at all; for tests and fixture runs.
    pub fn immediate() -> Self {
        Self {
            pause_min: Duration::ZERO,
            pause_max: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// Per-domain statistics snapshot.
#[derive(Debug, Clone)]
pub struct DomainStats {
    pub current_delay: Duration,
    pub in_backoff: bool,
    pub total_requests: u64,
    pub rate_limit_hits: u64,
}
