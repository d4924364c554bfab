use std::time::Duration;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// A uniform random source.
///
/// The delay policy never touches a generator directly; it draws
/// through this narrow interface so that tests can substitute a
/// deterministic source. Implementations must be safe to share across
/// concurrently processed requests.
pub trait UniformSource: Send + Sync {
    /// Draws a value uniformly from the closed interval `[low, high]`.
    /// Successive draws are independent.
    fn next_uniform(&self, low: i64, high: i64) -> i64;
}

/// The process-wide generator, serialized behind a mutex. Jitter is a
/// test aid, not a security boundary, so a small non-cryptographic
/// generator seeded from the OS is enough.
pub struct SharedRng(Mutex<SmallRng>);

impl Default for SharedRng {
    fn default() -> Self {
        Self(Mutex::new(SmallRng::from_os_rng()))
    }
}

impl UniformSource for SharedRng {
    fn next_uniform(&self, low: i64, high: i64) -> i64 {
        self.0.lock().random_range(low..=high)
    }
}

/// Computes the artificial delay applied to each binding response:
/// `base + uniform(-jitter, +jitter)`, clamped to zero when the jitter
/// outweighs the base. With both knobs at zero every response is sent
/// immediately.
pub struct DelayPolicy<S = SharedRng> {
    base_ms: u64,
    jitter_ms: u64,
    source: S,
}

impl DelayPolicy {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self::with_source(base_ms, jitter_ms, SharedRng::default())
    }
}

impl<S: UniformSource> DelayPolicy<S> {
    pub fn with_source(base_ms: u64, jitter_ms: u64, source: S) -> Self {
        Self {
            base_ms,
            jitter_ms,
            source,
        }
    }

    /// Whether the policy always yields a zero delay.
    pub fn is_immediate(&self) -> bool {
        self.base_ms == 0 && self.jitter_ms == 0
    }

    /// Whether some draws would go negative before clamping.
    pub fn is_clamping(&self) -> bool {
        self.jitter_ms > self.base_ms
    }

    /// Computes the delay for a single response. Each call draws fresh
    /// jitter; nothing is carried over between requests.
    pub fn next_delay(&self) -> Duration {
        if self.jitter_ms == 0 {
            return Duration::from_millis(self.base_ms);
        }

        let jitter = self.jitter_ms as i64;
        let offset = self.source.next_uniform(-jitter, jitter);

        Duration::from_millis((self.base_ms as i64 + offset).max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(i64);

    impl UniformSource for FixedSource {
        fn next_uniform(&self, low: i64, high: i64) -> i64 {
            assert!(low <= self.0 && self.0 <= high);

            self.0
        }
    }

    #[test]
    fn zero_configuration_is_immediate() {
        let policy = DelayPolicy::new(0, 0);

        assert!(policy.is_immediate());
        for _ in 0..100 {
            assert_eq!(policy.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn no_jitter_is_constant() {
        let policy = DelayPolicy::new(100, 0);

        assert!(!policy.is_immediate());
        for _ in 0..100 {
            assert_eq!(policy.next_delay(), Duration::from_millis(100));
        }
    }

    #[test]
    fn samples_stay_within_bounds() {
        let policy = DelayPolicy::new(100, 20);

        let mut seen_min = u128::MAX;
        let mut seen_max = u128::MIN;
        for _ in 0..10_000 {
            let millis = policy.next_delay().as_millis();
            assert!((80..=120).contains(&millis));

            seen_min = seen_min.min(millis);
            seen_max = seen_max.max(millis);
        }

        // uniform over 41 values, 10k draws: a constant stream would
        // mean a broken source
        assert!(seen_min < seen_max);
    }

    #[test]
    fn negative_draws_are_clamped() {
        let policy = DelayPolicy::with_source(5, 50, FixedSource(-50));

        assert!(policy.is_clamping());
        assert_eq!(policy.next_delay(), Duration::ZERO);
    }

    #[test]
    fn offset_is_applied() {
        let policy = DelayPolicy::with_source(100, 20, FixedSource(-20));
        assert_eq!(policy.next_delay(), Duration::from_millis(80));

        let policy = DelayPolicy::with_source(100, 20, FixedSource(20));
        assert_eq!(policy.next_delay(), Duration::from_millis(120));
    }
}
