//! Retry backoff with jitter.
//!
//! Registry endpoints rate-limit aggressively, and a batch of workers that
//! all failed at the same moment must not all retry at the same moment.
//! Delays grow exponentially per attempt and carry up to 20% random jitter.

use rand::Rng;
use std::time::Duration;

/// Exponential backoff policy shared by all cascade stages.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    initial: Duration,
    /// Upper bound on the exponential component (jitter may exceed it)
    max: Duration,
}

impl BackoffPolicy {
    /// Create a policy with the given initial delay and cap.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Compute the delay for a retry attempt.
    ///
    /// Attempt 0 is the delay before the first retry; the policy is never
    /// consulted before the first try. The exponential component is
    /// `min(max, initial * 2^attempt)`, with uniform jitter in
    /// `[0, 0.2 * component)` added on top.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self.initial.as_secs_f64() * 2f64.powi(attempt as i32);
        let capped = exponential.min(self.max.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(0.0..=capped * 0.2);
        Duration::from_secs_f64(capped + jitter)
    }

    /// Sleep for the computed delay of the given attempt.
    pub async fn sleep(&self, attempt: u32) {
        tokio::time::sleep(self.delay(attempt)).await;
    }
}

impl Default for BackoffPolicy {
    /// 1 second initial delay, capped at 8 seconds.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(8))
    }
}
