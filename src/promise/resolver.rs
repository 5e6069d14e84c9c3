//! Write handle given to promise producers.

use std::fmt;
use std::sync::Arc;

use super::Promise;
use crate::error::PromiseError;

/// The resolving side of a promise created with [`Promise::new`].
///
/// A `Resolver` can be cloned and moved to other threads. When the last clone
/// is dropped while the promise is still pending, the promise is rejected
/// with [`PromiseError::ResolverDropped`], so a producer that loses track of
/// its callback can never leave a consumer waiting forever.
///
/// ```rust
/// use promises::{Promise, PromiseError};
///
/// let promise = Promise::<i32>::new(|resolver| {
///     drop(resolver);
///     Ok(())
/// });
/// assert_eq!(promise.wait(), Err(PromiseError::ResolverDropped));
/// ```
pub struct Resolver<T, E = PromiseError> {
    abandon: Arc<Abandon<T, E>>,
}

struct Abandon<T, E> {
    promise: Promise<T, E>,
    on_drop: fn(&Promise<T, E>),
}

impl<T, E> Drop for Abandon<T, E> {
    fn drop(&mut self) {
        (self.on_drop)(&self.promise);
    }
}

fn reject_abandoned<T, E>(promise: &Promise<T, E>)
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    if promise.reject(PromiseError::ResolverDropped.into()) {
        tracing::debug!("last resolver dropped, rejecting pending promise");
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(promise: Promise<T, E>) -> Self
    where
        E: From<PromiseError>,
    {
        Self {
            abandon: Arc::new(Abandon {
                promise,
                on_drop: reject_abandoned::<T, E>,
            }),
        }
    }

    /// Fulfills the promise. Returns `false` if it was already resolved.
    pub fn fulfill(&self, value: T) -> bool {
        self.abandon.promise.fulfill(value)
    }

    /// Rejects the promise. Returns `false` if it was already resolved.
    pub fn reject(&self, error: E) -> bool {
        self.abandon.promise.reject(error)
    }

    /// Resolves the promise from a `Result`.
    pub fn resolve(&self, outcome: Result<T, E>) -> bool {
        self.abandon.promise.resolve(outcome)
    }

    /// Returns `true` once the promise has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.abandon.promise.is_pending()
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            abandon: Arc::clone(&self.abandon),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("Resolver")
            .field(&self.abandon.promise)
            .finish()
    }
}

static_assertions::assert_impl_all!(Resolver<i32>: Send, Sync, Clone);
