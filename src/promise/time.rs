//! Time-based operators.

use std::time::Duration;

use super::Promise;
use crate::error::PromiseError;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Delays a fulfillment by `interval`.
    ///
    /// The returned promise is fulfilled no earlier than `interval` after this
    /// promise is fulfilled. Rejections are forwarded immediately.
    pub fn delay(&self, interval: Duration) -> Self {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        let target = self.target.clone();
        self.observe(move |outcome| match outcome {
            Ok(value) => target.dispatch_after(interval, move || {
                output.fulfill(value);
            }),
            Err(error) => {
                output.reject(error);
            }
        });
        derived
    }

    /// Rejects with [`PromiseError::TimedOut`] unless this promise resolves
    /// within `interval`.
    ///
    /// Whichever happens first wins: a resolution arriving after the timeout
    /// is ignored by the returned promise.
    ///
    /// ```rust
    /// use promises::{Promise, PromiseError};
    /// use std::time::Duration;
    ///
    /// let never = Promise::<i32>::pending();
    /// let bounded = never.timeout(Duration::from_millis(10));
    /// assert_eq!(bounded.wait(), Err(PromiseError::TimedOut));
    /// ```
    pub fn timeout(&self, interval: Duration) -> Self
    where
        E: From<PromiseError>,
    {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            output.resolve(outcome);
        });

        // While the upstream is pending its observer keeps the derived
        // promise alive, so the timer only needs a weak handle. The timer
        // itself is uncounted; the pending derived promise covers it.
        let expiring = derived.downgrade();
        self.target.submit_after(
            interval,
            Box::new(move || {
                let Some(promise) = expiring.upgrade() else {
                    return;
                };
                if promise.reject(PromiseError::TimedOut.into()) {
                    tracing::debug!(?interval, "promise timed out");
                }
            }),
        );
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Target;
    use rstest::rstest;
    use std::thread;
    use std::time::Instant;

    #[rstest]
    fn delay_postpones_fulfillment() {
        let source = Promise::<i32>::pending_on(&Target::inline());
        let delayed = source.delay(Duration::from_millis(50));
        let started = Instant::now();

        source.fulfill(1);
        assert!(delayed.is_pending());
        assert_eq!(delayed.wait(), Ok(1));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[rstest]
    fn delay_forwards_rejection_immediately() {
        let source = Promise::<i32>::pending_on(&Target::inline());
        let delayed = source.delay(Duration::from_secs(60));

        source.reject(PromiseError::ValidationFailure);
        assert_eq!(delayed.error(), Some(PromiseError::ValidationFailure));
    }

    #[rstest]
    fn timeout_rejects_slow_promise() {
        let source = Promise::<i32>::pending_on(&Target::inline());
        let bounded = source.timeout(Duration::from_millis(20));

        assert_eq!(bounded.wait(), Err(PromiseError::TimedOut));
        source.fulfill(1);
        assert_eq!(bounded.error(), Some(PromiseError::TimedOut));
    }

    #[rstest]
    fn timeout_passes_through_fast_promise() {
        let source = Promise::<i32>::pending_on(&Target::inline());
        let bounded = source.timeout(Duration::from_millis(200));

        let resolver = source.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            resolver.fulfill(9);
        });

        assert_eq!(bounded.wait(), Ok(9));
        thread::sleep(Duration::from_millis(250));
        assert_eq!(bounded.value(), Some(9));
    }
}
