//! Transport-level retry with configurable delay growth and jitter.
//!
//! [`BackoffConfig`] controls how transient HTTP errors (429, 5xx) are
//! retried with increasing delays. The scaffolding generator uses
//! [`BackoffConfig::linear()`] so a user-facing request never stalls behind
//! an exponential blowup; batch callers can opt into
//! [`BackoffConfig::standard()`].

use std::time::Duration;

/// Configuration for transport-level retry.
///
/// Handles transient HTTP errors (429 rate limit, 500/502/503 server errors,
/// connection timeouts) by retrying with increasing delays.
///
/// # Example
///
/// ```
/// use scaffold_pipeline::backend::BackoffConfig;
///
/// // No retry
/// let none = BackoffConfig::none();
/// assert_eq!(none.max_retries, 0);
///
/// // Default: 3 retries with linearly growing delays
/// let linear = BackoffConfig::linear();
/// assert_eq!(linear.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Maximum number of transport retries. Default: 3.
    pub max_retries: u32,

    /// Initial delay before first retry. Default: 1 second.
    pub initial_delay: Duration,

    /// How the delay grows across attempts. Default: [`DelayGrowth::Linear`].
    pub growth: DelayGrowth,

    /// Maximum delay between retries. Default: 30 seconds.
    /// Prevents blowup on sustained outages.
    pub max_delay: Duration,

    /// Jitter strategy. Default: None for linear, Full for exponential.
    pub jitter: JitterStrategy,

    /// HTTP status codes that trigger retry. Default: `[429, 500, 502, 503, 504]`.
    pub retryable_statuses: Vec<u16>,

    /// Whether to respect `Retry-After` headers from the provider.
    /// Default: `true`.
    pub respect_retry_after: bool,
}

/// Delay growth schedule, expressed as data rather than a hardcoded formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayGrowth {
    /// Every retry waits exactly `initial_delay`.
    Fixed,

    /// Delay grows arithmetically: initial, 2x initial, 3x initial, ...
    Linear,

    /// Delay grows geometrically with the given multiplier:
    /// initial, initial * m, initial * m^2, ...
    Exponential(f64),
}

/// Jitter strategy to prevent thundering herd on shared rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterStrategy {
    /// No jitter. Delay is exactly the calculated value.
    None,

    /// Full jitter: random value in `[0, calculated_delay]`.
    Full,

    /// Equal jitter: `calculated_delay/2 + random in [0, calculated_delay/2]`.
    Equal,
}

impl BackoffConfig {
    /// No transport retry. For tests or when the caller handles errors itself.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::linear()
        }
    }

    /// Interactive defaults: 3 retries with delays of 1s, 2s, 3s, no
    /// jitter, respects Retry-After. Bounded and predictable, which matters
    /// when a user is watching a progress indicator.
    pub fn linear() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            growth: DelayGrowth::Linear,
            max_delay: Duration::from_secs(30),
            jitter: JitterStrategy::None,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Cloud-batch defaults: 3 retries, 1s initial, 2x exponential growth,
    /// 60s max, full jitter.
    pub fn standard() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            growth: DelayGrowth::Exponential(2.0),
            max_delay: Duration::from_secs(60),
            jitter: JitterStrategy::Full,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Calculate the delay for attempt N (0-indexed).
    ///
    /// The base delay follows the growth schedule, capped at `max_delay`.
    /// Jitter is then applied according to the configured strategy.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay.as_secs_f64();
        let base = match self.growth {
            DelayGrowth::Fixed => initial,
            DelayGrowth::Linear => initial * (attempt as f64 + 1.0),
            DelayGrowth::Exponential(multiplier) => initial * multiplier.powi(attempt as i32),
        };
        let capped = base.min(self.max_delay.as_secs_f64());

        let jittered = match self.jitter {
            JitterStrategy::None => capped,
            JitterStrategy::Full => fastrand::f64() * capped,
            JitterStrategy::Equal => capped / 2.0 + fastrand::f64() * (capped / 2.0),
        };

        Duration::from_secs_f64(jittered)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::linear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_delays_grow_arithmetically() {
        let config = BackoffConfig::linear();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(3));
    }

    #[test]
    fn fixed_delays_do_not_grow() {
        let config = BackoffConfig {
            growth: DelayGrowth::Fixed,
            ..BackoffConfig::linear()
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(1));
    }

    #[test]
    fn exponential_delays_double() {
        let config = BackoffConfig {
            growth: DelayGrowth::Exponential(2.0),
            jitter: JitterStrategy::None,
            ..BackoffConfig::standard()
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn delay_capped_at_max() {
        let config = BackoffConfig {
            growth: DelayGrowth::Exponential(2.0),
            jitter: JitterStrategy::None,
            max_delay: Duration::from_secs(5),
            ..BackoffConfig::standard()
        };
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn full_jitter_stays_in_range() {
        let config = BackoffConfig {
            jitter: JitterStrategy::Full,
            growth: DelayGrowth::Exponential(2.0),
            ..BackoffConfig::standard()
        };
        for _ in 0..100 {
            assert!(config.delay_for_attempt(1) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn presets() {
        assert_eq!(BackoffConfig::none().max_retries, 0);
        let linear = BackoffConfig::linear();
        assert_eq!(linear.growth, DelayGrowth::Linear);
        assert!(linear.retryable_statuses.contains(&429));
        assert!(linear.retryable_statuses.contains(&503));
        assert_eq!(BackoffConfig::default().max_retries, 3);
    }
}
