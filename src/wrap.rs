//! Adapters for completion-callback APIs.
//!
//! Many APIs report their result by calling a completion handler instead of
//! returning it. The functions in this module call such an API once, on a
//! dispatch target, with a boxed completion callback that resolves the
//! returned promise.
//!
//! | Adapter | Completion signature | Promise |
//! |---|---|---|
//! | [`wrap_unit`] | `()` | `Promise<(), E>` |
//! | [`wrap`] | `(T)` | `Promise<T, E>` |
//! | [`wrap_result`] | `(Result<T, E>)` | `Promise<T, E>` |
//! | [`wrap_value_error`] | `(T, Option<E>)` | `Promise<T, E>` |
//! | [`wrap_error_value`] | `(Option<E>, T)` | `Promise<T, E>` |
//! | [`wrap_optional_value_error`] | `(Option<T>, Option<E>)` | `Promise<Option<T>, E>` |
//! | [`wrap_error_optional_value`] | `(Option<E>, Option<T>)` | `Promise<Option<T>, E>` |
//!
//! When a completion reports both a value and an error, the error wins. If
//! the adapted function drops the completion without calling it, the promise
//! rejects with [`PromiseError::ResolverDropped`]. An error returned by the
//! adapted function itself rejects the promise as well.
//!
//! The free functions run on the default target; [`Wrap::on`] picks another
//! one.
//!
//! # Examples
//!
//! ```rust
//! use promises::{PromiseError, wrap_value_error};
//!
//! fn legacy_lookup(key: &str, completion: impl FnOnce(usize, Option<PromiseError>)) {
//!     completion(key.len(), None);
//! }
//!
//! let promise = wrap_value_error(|completion| {
//!     legacy_lookup("answer", completion);
//!     Ok(())
//! });
//! assert_eq!(promise.wait(), Ok(6));
//! ```

use crate::dispatch::Target;
use crate::error::PromiseError;
use crate::promise::Promise;

/// Completion callback receiving a single argument.
pub type Completion<A> = Box<dyn FnOnce(A) + Send + 'static>;

/// Completion callback receiving two arguments.
pub type Completion2<A, B> = Box<dyn FnOnce(A, B) + Send + 'static>;

/// Callback adapters bound to a specific target.
///
/// ```rust
/// use promises::{Target, Wrap};
///
/// let promise = Wrap::on(&Target::inline()).unit::<promises::PromiseError, _>(|done| {
///     done();
///     Ok(())
/// });
/// assert!(promise.is_fulfilled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Wrap {
    target: Target,
}

impl Wrap {
    /// Adapters that call the wrapped function on `target`.
    #[must_use]
    pub fn on(target: &Target) -> Self {
        Self {
            target: target.clone(),
        }
    }

    /// Adapts an API whose completion takes no arguments.
    pub fn unit<E, F>(&self, work: F) -> Promise<(), E>
    where
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Box<dyn FnOnce() + Send + 'static>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move || {
                resolver.fulfill(());
            }))
        })
    }

    /// Adapts an API whose completion takes the value.
    pub fn value<T, E, F>(&self, work: F) -> Promise<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion<T>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |value| {
                resolver.fulfill(value);
            }))
        })
    }

    /// Adapts an API whose completion takes a `Result`.
    pub fn result<T, E, F>(&self, work: F) -> Promise<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion<Result<T, E>>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |outcome| {
                resolver.resolve(outcome);
            }))
        })
    }

    /// Adapts an API whose completion takes a value and an optional error.
    pub fn value_error<T, E, F>(&self, work: F) -> Promise<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion2<T, Option<E>>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |value, error| {
                resolver.resolve(error.map_or(Ok(value), Err));
            }))
        })
    }

    /// Adapts an API whose completion takes an optional error and a value.
    pub fn error_value<T, E, F>(&self, work: F) -> Promise<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion2<Option<E>, T>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |error, value| {
                resolver.resolve(error.map_or(Ok(value), Err));
            }))
        })
    }

    /// Adapts an API whose completion takes an optional value and an
    /// optional error.
    pub fn optional_value_error<T, E, F>(&self, work: F) -> Promise<Option<T>, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion2<Option<T>, Option<E>>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |value, error| {
                resolver.resolve(error.map_or(Ok(value), Err));
            }))
        })
    }

    /// Adapts an API whose completion takes an optional error and an
    /// optional value.
    pub fn error_optional_value<T, E, F>(&self, work: F) -> Promise<Option<T>, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + From<PromiseError> + 'static,
        F: FnOnce(Completion2<Option<E>, Option<T>>) -> Result<(), E> + Send + 'static,
    {
        Promise::new_on(&self.target, move |resolver| {
            work(Box::new(move |error, value| {
                resolver.resolve(error.map_or(Ok(value), Err));
            }))
        })
    }
}

/// Adapts an API whose completion takes no arguments.
pub fn wrap_unit<E, F>(work: F) -> Promise<(), E>
where
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Box<dyn FnOnce() + Send + 'static>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().unit(work)
}

/// Adapts an API whose completion takes the value.
///
/// Optional values need no separate adapter: use `T = Option<U>`.
pub fn wrap<T, E, F>(work: F) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion<T>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().value(work)
}

/// Adapts an API whose completion takes a `Result`.
pub fn wrap_result<T, E, F>(work: F) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion<Result<T, E>>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().result(work)
}

/// Adapts an API whose completion takes a value and an optional error.
pub fn wrap_value_error<T, E, F>(work: F) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion2<T, Option<E>>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().value_error(work)
}

/// Adapts an API whose completion takes an optional error and a value.
pub fn wrap_error_value<T, E, F>(work: F) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion2<Option<E>, T>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().error_value(work)
}

/// Adapts an API whose completion takes an optional value and an optional
/// error.
pub fn wrap_optional_value_error<T, E, F>(work: F) -> Promise<Option<T>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion2<Option<T>, Option<E>>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().optional_value_error(work)
}

/// Adapts an API whose completion takes an optional error and an optional
/// value.
pub fn wrap_error_optional_value<T, E, F>(work: F) -> Promise<Option<T>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    F: FnOnce(Completion2<Option<E>, Option<T>>) -> Result<(), E> + Send + 'static,
{
    Wrap::default().error_optional_value(work)
}
