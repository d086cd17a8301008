//! Bounded exponential-backoff retry for single-record operations.
//!
//! # Responsibility
//! - Re-run an operation while it fails with a transient (busy) error.
//! - Propagate non-transient failures immediately.
//!
//! # Invariants
//! - At most `max_attempts` calls; the sleep happens only between attempts.
//! - Delays start at `initial_delay` and are multiplied after every retry.
//! - Sleeping blocks only the calling worker thread.

use log::{error, warn};
use std::fmt::Display;
use std::thread;
use std::time::Duration;

/// Default total attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Default delay multiplier applied after each retry.
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;

/// Errors that can tell whether retrying might help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Result of a retried operation plus how many calls it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Retry policy applied to every single-record insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Delay slept after failed attempt number `attempt` (1-based).
    ///
    /// Default policy: 100ms, 200ms, 400ms, 800ms.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    pub fn execute<T, E, F>(&self, mut op: F) -> Retried<T, E>
    where
        E: Transient + Display,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op() {
                Ok(value) => {
                    return Retried {
                        result: Ok(value),
                        attempts: attempt,
                    }
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "event=retry module=retry status=busy attempt={} max_attempts={} delay_ms={} error={}",
                        attempt,
                        max_attempts,
                        delay.as_millis(),
                        err
                    );
                    thread::sleep(delay);
                }
                Err(err) => {
                    if err.is_transient() {
                        error!(
                            "event=retry module=retry status=exhausted attempts={} error={}",
                            attempt, err
                        );
                    }
                    return Retried {
                        result: Err(err),
                        attempts: attempt,
                    };
                }
            }
        }
    }

    /// Like `execute`, dropping the attempt count.
    pub fn call<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: Transient + Display,
        F: FnMut() -> Result<T, E>,
    {
        self.execute(op).result
    }
}

#[cfg(test)]
mod tests {
    use super::{RetryPolicy, Transient};
    use std::fmt::{Display, Formatter};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Eq)]
    enum FakeError {
        Busy,
        Broken,
    }

    impl Display for FakeError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Transient for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, Self::Busy)
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_initial_delay(Duration::from_millis(1))
    }

    #[test]
    fn default_delays_double_from_100ms() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (1..=4)
            .map(|attempt| policy.delay_after(attempt).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800]);
    }

    #[test]
    fn permanent_error_is_not_retried() {
        let mut calls = 0;
        let retried = fast_policy().execute(|| -> Result<(), FakeError> {
            calls += 1;
            Err(FakeError::Broken)
        });

        assert_eq!(retried.result, Err(FakeError::Broken));
        assert_eq!(retried.attempts, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn busy_then_success_takes_k_plus_one_attempts() {
        let mut remaining_busy = 3;
        let retried = fast_policy().execute(|| {
            if remaining_busy > 0 {
                remaining_busy -= 1;
                Err(FakeError::Busy)
            } else {
                Ok("done")
            }
        });

        assert_eq!(retried.result, Ok("done"));
        assert_eq!(retried.attempts, 4);
    }

    #[test]
    fn always_busy_gives_up_after_five_attempts() {
        let mut calls = 0;
        let result = fast_policy().call(|| -> Result<(), FakeError> {
            calls += 1;
            Err(FakeError::Busy)
        });

        assert_eq!(result, Err(FakeError::Busy));
        assert_eq!(calls, 5);
    }

    #[test]
    fn no_retry_policy_calls_once() {
        let mut calls = 0;
        let _ = RetryPolicy::no_retry().call(|| -> Result<(), FakeError> {
            calls += 1;
            Err(FakeError::Busy)
        });
        assert_eq!(calls, 1);
    }
}
