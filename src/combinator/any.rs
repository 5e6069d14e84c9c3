use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::Target;
use crate::promise::Promise;

/// The outcome of one input of [`any`] or [`when`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Maybe<T, E> {
    /// The input fulfilled.
    Value(T),
    /// The input rejected.
    Error(E),
}

/// Name used by [`when`] for the same per-input outcome.
pub type When<T, E> = Maybe<T, E>;

impl<T, E> Maybe<T, E> {
    /// The value, if the input fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The error, if the input rejected.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Value(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Returns `true` for [`Maybe::Value`].
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns `true` for [`Maybe::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Converts back into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error held by [`Maybe::Error`].
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Error(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Maybe<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::Error(error),
        }
    }
}

struct Gather<T, E> {
    slots: Vec<Option<Maybe<T, E>>>,
    remaining: usize,
    fulfilled: bool,
}

/// Waits for every promise to resolve, tolerating partial failure.
///
/// See [`any_on`].
pub fn any<T, E, I>(promises: I) -> Promise<Vec<Maybe<T, E>>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    any_on(&Target::default(), promises)
}

/// Waits for every promise to resolve, running the bookkeeping on `target`.
///
/// Fulfills with one [`Maybe`] per input, in input order, as long as at
/// least one input fulfilled. If every input rejected, rejects with the error
/// of the input that rejected last. An empty input fulfills immediately with
/// an empty vector.
///
/// ```rust
/// use promises::{Maybe, Promise, PromiseError, any};
///
/// let results = any([
///     Promise::<i32>::rejected(PromiseError::TimedOut),
///     Promise::fulfilled(42),
/// ]);
/// assert_eq!(
///     results.wait(),
///     Ok(vec![Maybe::Error(PromiseError::TimedOut), Maybe::Value(42)])
/// );
/// ```
pub fn any_on<T, E, I>(target: &Target, promises: I) -> Promise<Vec<Maybe<T, E>>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let output = Promise::pending_on(target);
    if promises.is_empty() {
        output.fulfill(Vec::new());
        return output;
    }

    let gather = Arc::new(Mutex::new(Gather {
        slots: vec![None; promises.len()],
        remaining: promises.len(),
        fulfilled: false,
    }));

    for (index, promise) in promises.iter().enumerate() {
        let gather = Arc::clone(&gather);
        let sink = output.clone();
        promise.observe_on(target, move |outcome| {
            let error = outcome.as_ref().err().cloned();
            let values = {
                let mut gather = gather.lock();
                gather.slots[index] = Some(Maybe::from(outcome));
                gather.fulfilled |= error.is_none();
                gather.remaining -= 1;
                if gather.remaining > 0 {
                    return;
                }
                if gather.fulfilled {
                    Some(gather.slots.drain(..).flatten().collect::<Vec<_>>())
                } else {
                    None
                }
            };
            match (values, error) {
                (Some(values), _) => {
                    sink.fulfill(values);
                }
                (None, Some(error)) => {
                    tracing::trace!("every input rejected");
                    sink.reject(error);
                }
                (None, None) => {}
            }
        });
    }
    output
}

/// Same as [`any`].
pub fn when<T, E, I>(promises: I) -> Promise<Vec<When<T, E>>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    any(promises)
}

/// Same as [`any_on`].
pub fn when_on<T, E, I>(target: &Target, promises: I) -> Promise<Vec<When<T, E>>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    any_on(target, promises)
}
