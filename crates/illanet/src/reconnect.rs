//! Backoff between connection attempts.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How often and how patiently to retry a failed connect.
///
/// The delay before retry `n` (0-based) is `initial_delay * 2^n`, capped at
/// `max_delay`, plus a random extra of up to `jitter` times that delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of the delay added at random, `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Whether retry number `retry` (0-based) is still allowed.
    pub fn allows(&self, retry: u32) -> bool {
        retry < self.max_attempts
    }

    /// The delay before retry `retry`, without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.min(63)).unwrap_or(u64::MAX);
        let ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms.max(self.initial_delay_ms));
        Duration::from_millis(ms)
    }

    /// The delay before retry `retry`, jitter included.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || base.is_zero() {
            return base;
        }
        let extra = rand::rng().random_range(0.0..=jitter);
        base + base.mul_f64(extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(initial: u64, max: u64) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: 10,
            initial_delay_ms: initial,
            max_delay_ms: max,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_base_delay_doubles_until_cap() {
        let policy = fixed(100, 1_000);
        assert_eq!(policy.base_delay(0), Duration::from_millis(100));
        assert_eq!(policy.base_delay(1), Duration::from_millis(200));
        assert_eq!(policy.base_delay(3), Duration::from_millis(800));
        assert_eq!(policy.base_delay(4), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay(200), Duration::from_millis(1_000));
    }

    #[test]
    fn test_delay_for_without_jitter_is_exact() {
        let policy = fixed(250, 5_000);
        assert_eq!(policy.delay_for(2), Duration::from_millis(1_000));
    }

    #[test]
    fn test_delay_for_jitter_stays_in_bounds() {
        let policy = ReconnectPolicy {
            jitter: 0.5,
            ..fixed(100, 10_000)
        };
        for _ in 0..100 {
            let d = policy.delay_for(1);
            assert!(d >= Duration::from_millis(200), "{d:?}");
            assert!(d <= Duration::from_millis(300), "{d:?}");
        }
    }

    #[test]
    fn test_allows_counts_retries() {
        let policy = ReconnectPolicy {
            max_attempts: 2,
            ..ReconnectPolicy::default()
        };
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(!ReconnectPolicy::none().allows(0));
    }
}
