//! Continuation operators.
//!
//! Every operator returns a new promise bound to the receiving handle's
//! target and runs its closure on that target. Operators that only react to
//! one side of a resolution forward the other side unchanged. A closure that
//! panics rejects the returned promise with [`PromiseError::Panicked`].

use super::{Promise, attempt};
use crate::dispatch::guarded;
use crate::error::PromiseError;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    /// Transforms the fulfillment value with a fallible function.
    ///
    /// `work` runs only if this promise is fulfilled; its result resolves the
    /// returned promise. A rejection is forwarded without calling `work`.
    ///
    /// ```rust
    /// use promises::{Promise, PromiseError};
    ///
    /// let parsed = Promise::<&str, PromiseError>::fulfilled("42")
    ///     .then(|text| text.parse::<i32>().map_err(|_| PromiseError::ValidationFailure));
    /// assert_eq!(parsed.wait(), Ok(42));
    /// ```
    pub fn then<U, F>(&self, work: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        let derived = Promise::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            output.resolve(outcome.and_then(|value| attempt(|| work(value))));
        });
        derived
    }

    /// Chains an asynchronous step: the returned promise adopts the
    /// resolution of the promise `work` produces.
    pub fn and_then<U, F>(&self, work: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Promise<U, E> + Send + 'static,
    {
        let derived = Promise::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            match outcome.and_then(|value| guarded(|| work(value)).map_err(E::from)) {
                Ok(next) => next.pipe(output),
                Err(error) => {
                    output.reject(error);
                }
            }
        });
        derived
    }

    /// Transforms the fulfillment value with an infallible function.
    pub fn map<U, F>(&self, work: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.then(move |value| Ok(work(value)))
    }

    /// Observes the fulfillment value, keeping it unless `work` fails.
    pub fn inspect<F>(&self, work: F) -> Self
    where
        F: FnOnce(&T) -> Result<(), E> + Send + 'static,
    {
        self.then(move |value| {
            work(&value)?;
            Ok(value)
        })
    }

    /// Observes a rejection.
    ///
    /// `handler` runs only if this promise is rejected. The returned promise
    /// carries the same resolution as this one, so the error keeps
    /// propagating down the chain. Use [`recover`](Promise::recover) to
    /// replace an error with a value.
    pub fn catch<F>(&self, handler: F) -> Self
    where
        F: FnOnce(&E) + Send + 'static,
    {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            let outcome = match outcome {
                Err(error) => match guarded(|| handler(&error)) {
                    Ok(()) => Err(error),
                    Err(panicked) => Err(panicked.into()),
                },
                fulfilled => fulfilled,
            };
            output.resolve(outcome);
        });
        derived
    }

    /// Replaces a rejection with the result of `recovery`.
    ///
    /// A fulfillment is forwarded without calling `recovery`.
    pub fn recover<F>(&self, recovery: F) -> Self
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            output.resolve(outcome.or_else(|error| attempt(|| recovery(error))));
        });
        derived
    }

    /// Replaces a rejection with the resolution of the promise `recovery`
    /// produces.
    pub fn recover_with<F>(&self, recovery: F) -> Self
    where
        F: FnOnce(E) -> Self + Send + 'static,
    {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| match outcome {
            Ok(value) => {
                output.fulfill(value);
            }
            Err(error) => match guarded(|| recovery(error)) {
                Ok(next) => next.pipe(output),
                Err(panicked) => {
                    output.reject(panicked.into());
                }
            },
        });
        derived
    }

    /// Converts the rejection error.
    ///
    /// If `work` panics the returned promise is rejected with
    /// `R::from(PromiseError::Panicked)`.
    pub fn map_err<R, F>(&self, work: F) -> Promise<T, R>
    where
        R: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(E) -> R + Send + 'static,
    {
        let derived = Promise::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            output.resolve(
                outcome.map_err(|error| guarded(|| work(error)).unwrap_or_else(R::from)),
            );
        });
        derived
    }

    /// Runs `work` on either resolution and forwards the resolution
    /// unchanged.
    pub fn always<F>(&self, work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let derived = Self::pending_on(&self.target);
        let output = derived.clone();
        self.observe(move |outcome| {
            let outcome = match guarded(work) {
                Ok(()) => outcome,
                Err(panicked) => Err(panicked.into()),
            };
            output.resolve(outcome);
        });
        derived
    }

    /// Rejects with [`PromiseError::ValidationFailure`] if `predicate`
    /// refuses the fulfillment value.
    ///
    /// ```rust
    /// use promises::{Promise, PromiseError};
    ///
    /// let even = Promise::<i32>::fulfilled(3).validate(|value| value % 2 == 0);
    /// assert_eq!(even.wait(), Err(PromiseError::ValidationFailure));
    /// ```
    pub fn validate<F>(&self, predicate: F) -> Self
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.then(move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(PromiseError::ValidationFailure.into())
            }
        })
    }
}
