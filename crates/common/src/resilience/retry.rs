//! Generic retry with bounded backoff
//!
//! Retries an async operation a bounded number of times, sleeping between
//! attempts according to a backoff strategy with optional jitter. Callers
//! that need to distinguish retryable from fatal errors do so before handing
//! the operation here; everything that reaches this helper is treated as
//! retryable.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("all {attempts} retry attempts exhausted: {source}")]
    AttemptsExhausted { attempts: u32, source: E },
}

impl<E> RetryError<E> {
    /// The error returned by the final attempt
    pub fn into_source(self) -> E {
        match self {
            RetryError::AttemptsExhausted { source, .. } => source,
        }
    }
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay before the given retry attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter applied on top of the calculated delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        if delay_ms == 0 {
            return Duration::ZERO;
        }
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(rand::thread_rng().gen_range(0..=delay_ms)),
            Jitter::Equal => {
                let half = delay_ms / 2;
                Duration::from_millis(half + rand::thread_rng().gen_range(0..=delay_ms - half))
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter applied to each delay
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
        }
    }
}

impl RetryConfig {
    /// Create a config with a fixed number of attempts and default backoff
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::default() }
    }
}

/// Run an async operation, retrying on failure per the config
///
/// The operation is attempted at most `config.max_attempts` times. A config
/// with zero attempts is treated as one attempt.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(RetryError::AttemptsExhausted { attempts: attempt, source: err });
                }
                warn!(attempt, error = %err, "Attempt failed; will retry");

                let delay = config.jitter.apply(config.backoff.delay_for(attempt - 1));
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            backoff: BackoffStrategy::Fixed(Duration::from_millis(10)),
            jitter: Jitter::None,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: Result<u32, RetryError<String>> = retry(&fast_config(3), move || {
            let calls = Arc::clone(&calls_in_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: Result<&str, RetryError<String>> = retry(&fast_config(5), move || {
            let calls = Arc::clone(&calls_in_op);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient".to_string())
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: Result<(), RetryError<String>> = retry(&fast_config(3), move || {
            let calls = Arc::clone(&calls_in_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("still down".to_string())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(RetryError::AttemptsExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source, "still down");
            }
            Ok(()) => panic!("expected exhaustion"),
        }
    }

    #[test]
    fn test_exponential_backoff_caps_at_max() {
        let backoff = BackoffStrategy::Exponential {
            initial_delay: Duration::from_millis(100),
            base: 2.0,
            max_delay: Duration::from_millis(350),
        };

        assert_eq!(backoff.delay_for(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(350));
        assert_eq!(backoff.delay_for(10), Duration::from_millis(350));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let delay = Duration::from_millis(100);

        for _ in 0..50 {
            let full = Jitter::Full.apply(delay);
            assert!(full <= delay);

            let equal = Jitter::Equal.apply(delay);
            assert!(equal >= Duration::from_millis(50));
            assert!(equal <= delay);
        }

        assert_eq!(Jitter::None.apply(delay), delay);
    }
}
