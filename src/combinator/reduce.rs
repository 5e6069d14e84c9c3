use std::sync::Arc;

use crate::error::PromiseError;
use crate::promise::Promise;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    /// Folds `items` into this promise's value one asynchronous step at a
    /// time.
    ///
    /// Each step waits for the accumulator, then calls
    /// `reducer(accumulator, item)` and waits for the promise it returns. The
    /// first rejection, from this promise or any step, skips the remaining
    /// steps. A panicking `reducer` rejects with
    /// [`PromiseError::Panicked`]. With no items the result mirrors this
    /// promise.
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// let sum = Promise::<i32>::fulfilled(0)
    ///     .reduce(1..=4, |total, item| Promise::fulfilled(total + item));
    /// assert_eq!(sum.wait(), Ok(10));
    /// ```
    pub fn reduce<I, F>(&self, items: I, reducer: F) -> Self
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(T, I::Item) -> Self + Send + Sync + 'static,
    {
        let reducer = Arc::new(reducer);
        items.into_iter().fold(self.clone(), |accumulator, item| {
            let reducer = Arc::clone(&reducer);
            accumulator.and_then(move |value| reducer(value, item))
        })
    }
}
