/*!
 * Retry budget and backoff for translation batches.
 */

use rand::Rng;
use std::time::Duration;

use crate::app_config::RetryConfig;

/// Exponential backoff with bounded random jitter
///
/// The delay before retry `n` (1-based) is
/// `min(base * 2^(n-1), max) + uniform(0..=jitter)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Cap for the doubled delay
    pub max_delay_ms: u64,
    /// Upper bound of the random extra delay
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter_ms: config.jitter_ms,
        }
    }

    /// Retry immediately, as many times as given
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_ms: 0,
        }
    }

    /// Total number of calls a batch may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Deterministic part of the delay before retry `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }

    /// Full delay before retry `retry`, jitter included
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::rng().random_range(0..=self.jitter_ms)
        } else {
            0
        };
        self.backoff(retry) + Duration::from_millis(jitter)
    }
}
