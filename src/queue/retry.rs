//! Retry policy for failed jobs

use std::time::Duration;

/// How long to wait before each retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry
    Fixed(Duration),

    /// `base`, then `2 * base`, `4 * base`, ...
    Exponential { base: Duration },
}

impl Backoff {
    /// Delay before re-queuing a job whose attempt number `failed_attempt` failed
    pub fn delay(&self, failed_attempt: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(failed_attempt))
            }
        }
    }
}

/// Decides whether and when a failed job runs again
///
/// The default allows exactly one retry, sixty seconds after the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential { base },
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Returns the delay before the next attempt, or `None` to drop the job
    ///
    /// # Arguments
    ///
    /// * `failed_attempt` - The attempt number that just failed (0 for the first try)
    pub fn delay_for(&self, failed_attempt: u32) -> Option<Duration> {
        if failed_attempt >= self.max_retries {
            return None;
        }
        Some(self.backoff.delay(failed_attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(1, Duration::from_secs(60))
    }
}
