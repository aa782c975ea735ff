//! Retry policy shared by the advisor's and the relay's fallback loops.
//!
//! A [`RetryPolicy`] re-runs one operation (one model) with exponential
//! backoff while a caller-supplied predicate says the outcome is worth
//! retrying. Moving on to the next model is the caller's loop; both loops
//! decide by matching on [`Outcome`].

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use disco_core::config::RetryConfig;

use crate::outcome::Outcome;

/// Upper bound on any single backoff sleep.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Attempts, base delay, and growth factor for same-model retries.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.multiplier)
    }
}

impl RetryPolicy {
    /// At least one attempt is always made; multipliers below 1 are raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sleep after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= MAX_DELAY.as_secs_f64() {
            MAX_DELAY
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Run `op` until it succeeds, the attempts run out, or `retryable`
    /// rejects the outcome. Returns the last outcome and the number of
    /// attempts made.
    ///
    /// `op` and `retryable` receive the 1-based attempt number.
    pub async fn run<T, F, Fut, P>(
        &self,
        label: &str,
        mut op: F,
        retryable: P,
    ) -> (Outcome<T>, u32)
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Outcome<T>>,
        P: Fn(&Outcome<T>, u32) -> bool,
    {
        let mut attempt = 1;
        loop {
            let outcome = op(attempt).await;
            if outcome.is_success()
                || attempt >= self.max_attempts
                || !retryable(&outcome, attempt)
            {
                return (outcome, attempt);
            }

            let delay = self.delay_for(attempt);
            debug!(
                label,
                attempt,
                kind = outcome.kind(),
                reason = outcome.reason().unwrap_or_default(),
                delay_ms = delay.as_millis() as u64,
                "attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Order-preserving de-duplication of a candidate model list.
///
/// Blank entries are dropped; names are trimmed.
pub fn dedup_models<I, S>(models: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for model in models {
        let model = model.as_ref().trim();
        if !model.is_empty() && !seen.iter().any(|m| m == model) {
            seen.push(model.to_string());
        }
    }
    seen
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(500), 2.0)
    }

    #[test]
    fn test_delay_doubles() {
        let p = policy(5);
        assert_eq!(p.delay_for(1), Duration::from_millis(500));
        assert_eq!(p.delay_for(2), Duration::from_millis(1000));
        assert_eq!(p.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_is_capped() {
        let p = policy(100);
        assert_eq!(p.delay_for(40), MAX_DELAY);
    }

    #[test]
    fn test_new_clamps_inputs() {
        let p = RetryPolicy::new(0, Duration::from_millis(10), 0.1);
        assert_eq!(p.max_attempts(), 1);
        assert_eq!(p.delay_for(3), Duration::from_millis(10));
    }

    #[test]
    fn test_from_config() {
        let p = RetryPolicy::from(&RetryConfig::default());
        assert_eq!(p, RetryPolicy::new(2, Duration::from_millis(500), 2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let (outcome, attempts) = policy(3)
            .run(
                "m",
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Outcome::Transient("busy".to_string())
                        } else {
                            Outcome::Success(attempt)
                        }
                    }
                },
                |o, _| o.is_transient(),
            )
            .await;

        assert_eq!(outcome, Outcome::Success(3));
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500ms + 1000ms of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_attempts_exhausted() {
        let calls = AtomicU32::new(0);
        let (outcome, attempts): (Outcome<()>, u32) = policy(2)
            .run(
                "m",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Outcome::Transient("busy".to_string()) }
                },
                |o, _| o.is_transient(),
            )
            .await;

        assert!(outcome.is_transient());
        assert_eq!(attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_does_not_retry_rejected_outcome() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let (outcome, attempts): (Outcome<()>, u32) = policy(5)
            .run(
                "m",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Outcome::Fatal("401".to_string()) }
                },
                |o, _| o.is_transient(),
            )
            .await;

        assert!(outcome.is_fatal());
        assert_eq!(attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_dedup_models_preserves_order() {
        let models = dedup_models(["a", " b ", "a", "", "c", "b"]);
        assert_eq!(models, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_models_empty() {
        assert!(dedup_models(Vec::<String>::new()).is_empty());
    }
}
