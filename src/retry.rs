//! Re-running work that produces a rejected promise.
//!
//! [`retry`] calls a work closure, and if the promise it returns rejects,
//! calls it again after a pause, up to a configured number of extra
//! attempts. A [`RetryPolicy`] controls the attempt count, the pause, an
//! optional condition deciding whether a given error is worth retrying, and
//! the target the work runs on.
//!
//! # Examples
//!
//! ```rust
//! use promises::{Promise, PromiseError, RetryPolicy, retry};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//!
//! let policy = RetryPolicy::new()
//!     .with_attempts(3)
//!     .with_delay(Duration::from_millis(1));
//! let result = retry(policy, move || {
//!     if counter.fetch_add(1, Ordering::SeqCst) < 2 {
//!         Promise::<i32>::rejected(PromiseError::TimedOut)
//!     } else {
//!         Promise::fulfilled(42)
//!     }
//! });
//!
//! assert_eq!(result.wait(), Ok(42));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config;
use crate::dispatch::{Target, guarded};
use crate::error::PromiseError;
use crate::promise::Promise;

type Condition<E> = Arc<dyn Fn(usize, &E) -> bool + Send + Sync + 'static>;

/// Controls how [`retry`] re-runs failing work.
pub struct RetryPolicy<E> {
    attempts: usize,
    delay: Duration,
    condition: Option<Condition<E>>,
    target: Option<Target>,
}

impl<E> RetryPolicy<E> {
    /// Creates a policy from the configured defaults.
    ///
    /// Unless overridden through [`Config`](crate::Config), this allows one
    /// retry after a one second pause, retries every error, and runs on the
    /// default target.
    #[must_use]
    pub fn new() -> Self {
        let config = config::current();
        Self {
            attempts: config.retry_attempts(),
            delay: config.retry_delay(),
            condition: None,
            target: None,
        }
    }

    /// Sets the number of retries after the first attempt.
    ///
    /// `0` runs the work exactly once.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the pause between a rejection and the next attempt.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Only retries when `condition(remaining, &error)` returns `true`.
    ///
    /// `remaining` is the number of retries still available, counted before
    /// the one being considered.
    #[must_use]
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(usize, &E) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Runs the work and its bookkeeping on `target`.
    #[must_use]
    pub fn on(mut self, target: &Target) -> Self {
        self.target = Some(target.clone());
        self
    }

    /// Retries after the first attempt.
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    fn allows(&self, remaining: usize, error: &E) -> bool {
        remaining > 0
            && self
                .condition
                .as_ref()
                .is_none_or(|condition| condition(remaining, error))
    }
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            attempts: self.attempts,
            delay: self.delay,
            condition: self.condition.clone(),
            target: self.target.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RetryPolicy")
            .field("attempts", &self.attempts)
            .field("delay", &self.delay)
            .field("conditional", &self.condition.is_some())
            .field("target", &self.target)
            .finish()
    }
}

struct Retrying<T, E, F> {
    work: F,
    policy: RetryPolicy<E>,
    target: Target,
    output: Promise<T, E>,
}

impl<T, E, F> Retrying<T, E, F>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: Fn() -> Promise<T, E> + Send + Sync + 'static,
{
    fn attempt(self: Arc<Self>, remaining: usize) {
        match guarded(|| (self.work)()) {
            Ok(promise) => {
                let target = self.target.clone();
                promise.observe_on(&target, move |outcome| self.settle(outcome, remaining));
            }
            Err(panicked) => self.settle(Err(panicked.into()), remaining),
        }
    }

    fn settle(self: Arc<Self>, outcome: Result<T, E>, remaining: usize) {
        let error = match outcome {
            Ok(value) => {
                self.output.fulfill(value);
                return;
            }
            Err(error) => error,
        };
        match guarded(|| self.policy.allows(remaining, &error)) {
            Ok(true) => {
                tracing::debug!(
                    remaining,
                    delay = ?self.policy.delay,
                    "attempt rejected, retrying"
                );
                let target = self.target.clone();
                let delay = self.policy.delay;
                target.dispatch_after(delay, move || self.attempt(remaining - 1));
            }
            Ok(false) => {
                self.output.reject(error);
            }
            Err(panicked) => {
                self.output.reject(panicked.into());
            }
        }
    }
}

/// Runs `work` and retries it according to `policy` while the promise it
/// returns rejects.
///
/// `work` runs on the policy's target at most `attempts + 1` times. The
/// returned promise fulfills with the first fulfilled attempt, or rejects
/// with the error of the last attempt once retries are exhausted or the
/// policy's condition declines to retry. A panicking `work` counts as an
/// attempt rejected with [`PromiseError::Panicked`]; a panicking condition
/// ends the retries with that error.
pub fn retry<T, E, F>(policy: RetryPolicy<E>, work: F) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: Fn() -> Promise<T, E> + Send + Sync + 'static,
{
    let target = policy.target.clone().unwrap_or_default();
    let output = Promise::pending_on(&target);
    let attempts = policy.attempts;
    let retrying = Arc::new(Retrying {
        work,
        policy,
        target: target.clone(),
        output: output.clone(),
    });
    target.dispatch(move || retrying.attempt(attempts));
    output
}
