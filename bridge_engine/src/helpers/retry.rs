//! A small exponential-backoff retry loop for the forward-to-UISP call.
//!
//! The loop sleeps with [`tokio::time::sleep`], so waiting between attempts suspends only this task.
//! Other in-flight webhooks keep being served.
use std::{fmt::Display, future::Future, time::Duration};

use log::*;

/// Caps the backoff exponent so the factor arithmetic cannot overflow.
const MAX_EXPONENT: u32 = 20;

/// Backoff schedule for a retried operation. The delay before retry `n` is
/// `min(initial_delay * multiplier^n, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt, so `max_retries + 1` attempts in total.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration, multiplier: u32) -> Self {
        Self { max_retries, initial_delay, max_delay, multiplier }
    }

    /// A policy that never retries. Handy in tests and for callers that want a single attempt.
    pub fn no_retries() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(attempt.min(MAX_EXPONENT));
        let factor = u32::try_from(factor).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs `op` up to `max_retries + 1` times, sleeping between attempts according to the policy.
///
/// `op` receives the zero-based attempt number. Before each retry, `on_retry` runs with the one-based retry
/// number; its failure is logged and the schedule carries on, so a flaky observer can never abort the loop.
/// On success the result is returned immediately with no further delay. On exhaustion the last error is
/// returned to the caller.
pub async fn retry_with_policy<T, E, F, Fut, O, OFut, OE>(
    policy: &RetryPolicy,
    mut op: F,
    mut on_retry: O,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    O: FnMut(u32) -> OFut,
    OFut: Future<Output = Result<(), OE>>,
    OE: Display,
{
    let mut attempt = 0u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_retries => {
                warn!("⏱️ All {} attempts failed. Giving up. Last error: {e}", policy.total_attempts());
                return Err(e);
            },
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "⏱️ Attempt {} of {} failed: {e}. Retrying in {}ms",
                    attempt + 1,
                    policy.total_attempts(),
                    delay.as_millis()
                );
                if let Err(oe) = on_retry(attempt + 1).await {
                    error!("⏱️ Retry observer failed: {oe}. Carrying on with the schedule.");
                }
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use super::*;

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(2), Duration::from_millis(10), 2)
    }

    #[test]
    fn delays_grow_and_are_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350), 2);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(350));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(350));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn succeeds_without_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let observed = Arc::new(AtomicU32::new(0));
        let result: Result<u32, String> = retry_with_policy(
            &quick_policy(3),
            |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                }
            },
            |_| {
                let observed = observed.clone();
                async move {
                    observed.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausts_the_budget_and_returns_the_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let observed = Arc::new(AtomicU32::new(0));
        let result: Result<u32, String> = retry_with_policy(
            &quick_policy(3),
            |attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(format!("boom {attempt}"))
                }
            },
            |_| {
                let observed = observed.clone();
                async move {
                    observed.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
        )
        .await;
        assert_eq!(result, Err("boom 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(observed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_midway_through_the_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<&str, String> = retry_with_policy(
            &quick_policy(5),
            |attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok("done")
                    }
                }
            },
            |_| async { Ok::<(), String>(()) },
        )
        .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn observer_failures_do_not_abort_the_loop() {
        let result: Result<u32, String> = retry_with_policy(
            &quick_policy(2),
            |attempt| async move {
                if attempt < 2 {
                    Err("flaky".to_string())
                } else {
                    Ok(1)
                }
            },
            |_| async { Err::<(), String>("observer offline".to_string()) },
        )
        .await;
        assert_eq!(result, Ok(1));
    }
}
