//! Constructors that run producer code on a dispatch target.

use super::{Promise, Resolver, attempt};
use crate::dispatch::Target;
use crate::error::PromiseError;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a promise whose producer runs on the default target.
    ///
    /// See [`Promise::new_on`].
    pub fn new<F>(work: F) -> Self
    where
        E: From<PromiseError>,
        F: FnOnce(Resolver<T, E>) -> Result<(), E> + Send + 'static,
    {
        Self::new_on(&Target::default(), work)
    }

    /// Creates a promise whose producer runs on `target`.
    ///
    /// `work` receives a [`Resolver`] it may keep, clone, or hand to another
    /// thread. If `work` returns an error the promise is rejected with it.
    /// If every resolver is dropped before resolving, the promise is rejected
    /// with [`PromiseError::ResolverDropped`]; if `work` panics, with
    /// [`PromiseError::Panicked`].
    ///
    /// ```rust
    /// use promises::{Promise, Target};
    /// use std::thread;
    ///
    /// let promise = Promise::<String>::new_on(&Target::inline(), |resolver| {
    ///     thread::spawn(move || resolver.fulfill("done".to_owned()));
    ///     Ok(())
    /// });
    /// assert_eq!(promise.wait().as_deref(), Ok("done"));
    /// ```
    pub fn new_on<F>(target: &Target, work: F) -> Self
    where
        E: From<PromiseError>,
        F: FnOnce(Resolver<T, E>) -> Result<(), E> + Send + 'static,
    {
        let promise = Self::pending_on(target);
        let resolver = Resolver::new(promise.clone());
        target.dispatch(move || {
            // Held across `work` so an early drop cannot mask its error.
            let held = resolver.clone();
            if let Err(error) = attempt(|| work(resolver)) {
                held.reject(error);
            }
        });
        promise
    }

    /// Runs `work` on the default target and resolves with its result.
    pub fn spawn<F>(work: F) -> Self
    where
        E: From<PromiseError>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Self::spawn_on(&Target::default(), work)
    }

    /// Runs `work` on `target` and resolves with its result, rejecting with
    /// [`PromiseError::Panicked`] if it panics.
    pub fn spawn_on<F>(target: &Target, work: F) -> Self
    where
        E: From<PromiseError>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let promise = Self::pending_on(target);
        let output = promise.clone();
        target.dispatch(move || {
            output.resolve(attempt(work));
        });
        promise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchQueue;
    use rstest::rstest;
    use std::thread;
    use std::time::Duration;

    #[rstest]
    fn new_resolves_through_resolver() {
        let promise = Promise::<i32>::new(|resolver| {
            resolver.fulfill(4);
            Ok(())
        });
        assert_eq!(promise.wait(), Ok(4));
    }

    #[rstest]
    fn new_rejects_with_work_error() {
        let promise = Promise::<i32>::new(|_resolver| Err(PromiseError::ValidationFailure));
        assert_eq!(promise.wait(), Err(PromiseError::ValidationFailure));
    }

    #[rstest]
    fn new_rejects_when_resolver_is_lost() {
        let promise = Promise::<i32>::new(|_resolver| Ok(()));
        assert_eq!(promise.wait(), Err(PromiseError::ResolverDropped));
    }

    #[rstest]
    fn new_supports_late_resolution() {
        let promise = Promise::<i32>::new(|resolver| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                resolver.fulfill(8);
            });
            Ok(())
        });
        assert_eq!(promise.wait(), Ok(8));
    }

    #[rstest]
    fn spawn_on_runs_on_target() {
        let queue = Target::new(DispatchQueue::new("test.spawn"));
        let promise = Promise::<String>::spawn_on(&queue, || {
            Ok(thread::current().name().unwrap_or_default().to_owned())
        });
        assert_eq!(promise.wait().as_deref(), Ok("test.spawn"));
    }

    #[rstest]
    fn spawn_propagates_error() {
        let promise = Promise::<i32>::spawn(|| Err(PromiseError::TimedOut));
        assert_eq!(promise.wait(), Err(PromiseError::TimedOut));
    }

    #[rstest]
    fn new_rejects_when_work_panics() {
        let promise = Promise::<i32>::new_on(&Target::inline(), |_resolver| panic!("producer failed"));
        assert_eq!(promise.wait(), Err(PromiseError::Panicked));
    }

    #[rstest]
    fn spawn_rejects_when_work_panics() {
        let promise = Promise::<i32>::spawn(|| panic!("producer failed"));
        assert_eq!(promise.wait(), Err(PromiseError::Panicked));
    }
}
