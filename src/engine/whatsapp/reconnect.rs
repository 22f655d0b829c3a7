// WhatsApp — Reconnect Policy
//
// Bounded exponential backoff for re-initialising the client after a
// disconnect:
//   • attempt 0 runs immediately
//   • attempt n waits base·2^(n-1), capped, with ±25% jitter
//   • after `max_attempts` failures the relay gives up and marks the
//     session faulted

use crate::atoms::constants::{
    RECONNECT_BASE_DELAY_MS, RECONNECT_MAX_ATTEMPTS, RECONNECT_MAX_DELAY_MS,
};
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Total re-initialisation attempts per disconnect (0 disables reconnect).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Apply ±25% jitter to computed delays.
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_attempts: RECONNECT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RECONNECT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RECONNECT_MAX_DELAY_MS),
            jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// Reconnect immediately, up to `max_attempts` times, with no waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        ReconnectPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before 0-based `attempt`, or `None` once attempts are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        if attempt == 0 {
            return Some(Duration::ZERO);
        }
        let base_ms = self.base_delay.as_millis() as u64;
        let exp_ms = base_ms.saturating_mul(2u64.saturating_pow((attempt - 1).min(12)));
        let capped_ms = exp_ms.min(self.max_delay.as_millis() as u64);
        let delay_ms = if self.jitter { apply_jitter(capped_ms) } else { capped_ms };
        Some(Duration::from_millis(delay_ms))
    }
}

/// Apply ±25% jitter, drawn uniformly over the whole range.
fn apply_jitter(base_ms: u64) -> u64 {
    let jitter_range = (base_ms / 4) as i64;
    if jitter_range == 0 {
        return base_ms;
    }
    let offset = rand::rng().random_range(-jitter_range..=jitter_range);
    (base_ms as i64 + offset).max(0) as u64
}
