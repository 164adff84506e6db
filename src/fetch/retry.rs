// src/fetch/retry.rs
// =============================================================================
// Retry budget and backoff schedule for transport-level failures.
//
// Delay before retry n (0-based) is base * 2^n, capped at max_delay:
//   base = 1s  ->  1s, 2s, 4s, 8s, 16s, ...
// No jitter: we only ever talk to a handful of hosts and the fixed
// download throttle already spreads requests out.
// =============================================================================

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    // Single attempt, no waiting
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}
