//! Per-domain rate limiting state.

use std::time::{Duration, Instant};

/// State for a single domain.
#[derive(Debug, Clone)]
pub struct DomainState {
    /// Current spacing for this domain.
    pub current_delay: Duration,
    /// Last request time.
    pub last_request: Option<Instant>,
    /// Consecutive successes since the last backoff step.
    pub consecutive_successes: u32,
    /// Whether currently in backoff.
    pub in_backoff: bool,
    pub total_requests: u64,
    pub rate_limit_hits: u64,
}

impl DomainState {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            current_delay: base_delay,
            last_request: None,
            consecutive_successes: 0,
            in_backoff: false,
            total_requests: 0,
            rate_limit_hits: 0,
        }
    }

    /// Time until this domain is ready for another request.
    pub fn time_until_ready(&self) -> Duration {
        match self.last_request {
            Some(last) => self.current_delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Multiply the delay, entering backoff.
    pub fn back_off(&mut self, multiplier: f64, floor: Duration, ceiling: Duration) {
        self.rate_limit_hits += 1;
        self.consecutive_successes = 0;
        self.in_backoff = true;
        let grown = Duration::from_secs_f64(self.current_delay.as_secs_f64() * multiplier);
        self.current_delay = grown.max(floor).min(ceiling);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_domain_is_ready() {
        let state = DomainState::new(Duration::from_millis(100));
        assert_eq!(state.time_until_ready(), Duration::ZERO);
    }

    #[test]
    fn test_back_off_respects_bounds() {
        let mut state = DomainState::new(Duration::ZERO);
        state.back_off(2.0, Duration::from_secs(1), Duration::from_secs(3));
        assert_eq!(state.current_delay, Duration::from_secs(1));
        state.back_off(2.0, Duration::from_secs(1), Duration::from_secs(3));
        state.back_off(2.0, Duration::from_secs(1), Duration::from_secs(3));
        assert_eq!(state.current_delay, Duration::from_secs(3));
        assert!(state.in_backoff);
        assert_eq!(state.rate_limit_hits, 3);
    }
}
