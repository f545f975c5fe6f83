//! Retry configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the executor retries transient failures.
///
/// `max_retries` bounds the total number of remote attempts per invocation,
/// shared between rate-limit signals and transport failures.
///
/// ```toml
/// [retry]
/// max_retries = 3
/// base_delay_ms = 500
/// max_delay_ms = 30000
/// rate_limit_delay_ms = 1000
/// jitter = false
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct RetryConfig {
    /// Total attempts allowed per invocation
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// First backoff delay after a transport failure (milliseconds)
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,

    /// Ceiling on any single delay (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,

    /// Pause after a 429 without a Retry-After hint (milliseconds)
    #[serde(default = "default_rate_limit_delay_ms")]
    rate_limit_delay_ms: u64,

    /// Randomize backoff delays
    #[serde(default)]
    jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_rate_limit_delay_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Total attempts, never less than one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay ceiling as a duration.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Exponential backoff before the attempt following `attempt`.
    ///
    /// `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let millis = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        let delay = Duration::from_millis(millis);
        if self.jitter {
            tokio_retry2::strategy::jitter(delay).min(self.max_delay())
        } else {
            delay
        }
    }

    /// Pause after a rate-limit signal, honoring the service's hint.
    pub fn rate_limit_delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after
            .unwrap_or(Duration::from_millis(self.rate_limit_delay_ms))
            .min(self.max_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig::default()
            .with_base_delay_ms(100)
            .with_max_delay_ms(350);

        assert_eq!(config.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(350));
        assert_eq!(config.backoff_delay(40), Duration::from_millis(350));
    }

    #[test]
    fn test_rate_limit_delay_prefers_hint() {
        let config = RetryConfig::default();
        assert_eq!(config.rate_limit_delay(None), Duration::from_secs(1));
        assert_eq!(
            config.rate_limit_delay(Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            config.rate_limit_delay(Some(Duration::from_secs(3600))),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let config = RetryConfig::default().with_max_retries(0);
        assert_eq!(config.max_attempts(), 1);
    }
}
