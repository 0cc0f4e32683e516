// src/ingest/retry.rs
//! Retry policy for feed fetches: bounded attempts with exponential backoff.
//! Sleeping goes through `Sleeper` so tests can record delays instead of waiting.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Delay after failed attempt `attempt` (0-based): base * multiplier^attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1).saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Every delay slept when all attempts fail (none after the last one).
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|a| self.delay_for(a))
            .collect()
    }

    pub fn total_backoff(&self) -> Duration {
        self.schedule().into_iter().sum()
    }
}

#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, d: Duration);
}

/// Real sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_two_then_four() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.schedule(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert_eq!(p.total_backoff(), Duration::from_secs(6));
    }

    #[test]
    fn single_attempt_never_sleeps() {
        let p = RetryPolicy::new(1, Duration::from_secs(2));
        assert!(p.schedule().is_empty());
    }

    #[test]
    fn zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn huge_exponent_saturates() {
        let p = RetryPolicy::default();
        assert!(p.delay_for(200) >= p.delay_for(10));
    }
}
