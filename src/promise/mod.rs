//! The promise core: a single-assignment, thread-safe result container.
//!
//! A [`Promise<T, E>`] starts out pending and is resolved exactly once,
//! either fulfilled with a `T` or rejected with an `E`. Continuations
//! registered while it is pending are queued as observers; resolving the
//! promise hands each of them to its dispatch target in registration order.
//! Continuations registered after resolution are dispatched right away.
//!
//! # State machine
//!
//! ```text
//!            fulfill(value)
//!          ┌───────────────▶ Fulfilled(value)
//! Pending ─┤
//!          └───────────────▶ Rejected(error)
//!            reject(error)
//! ```
//!
//! Only the first `fulfill`/`reject`/`resolve` call has any effect, even
//! when several threads race; the others return `false`.
//!
//! # Keep-alive
//!
//! A promise derived from another one (through `then`, `catch`, a
//! combinator, ...) is owned by the continuation registered on its upstream.
//! Dropping every handle to the derived promise therefore does not destroy
//! it: it stays alive until the upstream resolves and the continuation has
//! run. [`Promise::downgrade`] makes this observable.
//!
//! # Examples
//!
//! ```rust
//! use promises::{Promise, PromiseError};
//!
//! let promise = Promise::<i32, PromiseError>::pending();
//! let doubled = promise.then(|value| Ok(value * 2));
//!
//! assert!(promise.fulfill(21));
//! assert!(!promise.fulfill(0));
//! assert_eq!(doubled.wait(), Ok(42));
//! ```

mod chain;
mod construct;
mod resolver;
mod time;
mod wait;

pub use resolver::Resolver;
pub use wait::PromiseFuture;

use std::fmt;
use std::mem;
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;

use crate::dispatch::{Target, WorkToken, guarded};
use crate::error::PromiseError;

type Callback<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

/// A continuation waiting for a resolution, bound to the target it runs on.
struct Observer<T, E> {
    target: Target,
    callback: Callback<T, E>,
}

impl<T, E> Observer<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn deliver(self, outcome: Result<T, E>) {
        let callback = self.callback;
        self.target.dispatch(move || callback(outcome));
    }
}

struct Inner<T, E> {
    outcome: Option<Result<T, E>>,
    observers: SmallVec<[Observer<T, E>; 2]>,
    // Set while the resolving thread is handing observers to their targets.
    // Late registrations queue up behind them instead of overtaking them.
    draining: bool,
    // Counts the promise as outstanding work until it resolves or is dropped.
    work: Option<WorkToken>,
}

impl<T: Clone, E: Clone> Inner<T, E> {
    /// The outcome, once every observer taken at resolution has been handed
    /// to its target.
    fn delivered(&self) -> Option<Result<T, E>> {
        if self.draining {
            None
        } else {
            self.outcome.clone()
        }
    }
}

struct Core<T, E> {
    inner: Mutex<Inner<T, E>>,
    // Signalled once a resolution has been delivered; blocking waits park here.
    settled: Condvar,
}

/// Runs a fallible user closure, rejecting with [`PromiseError::Panicked`]
/// if it panics.
pub(crate) fn attempt<U, E, F>(work: F) -> Result<U, E>
where
    E: From<PromiseError>,
    F: FnOnce() -> Result<U, E>,
{
    guarded(work).unwrap_or_else(|panicked| Err(panicked.into()))
}

/// Snapshot of a promise's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State<T, E> {
    /// Not resolved yet.
    Pending,
    /// Resolved with a value.
    Fulfilled(T),
    /// Resolved with an error.
    Rejected(E),
}

/// A single-assignment container for the eventual result of an asynchronous
/// computation.
///
/// `Promise` is a handle: cloning it is cheap and every clone refers to the
/// same underlying state. Each handle also carries the dispatch [`Target`] on
/// which continuations registered through it run; promises derived from a
/// handle inherit that target. [`Promise::on`] rebinds a handle to another
/// target.
///
/// Values and errors are cloned once per continuation, so large payloads are
/// best wrapped in an `Arc`.
pub struct Promise<T, E = PromiseError> {
    core: Arc<Core<T, E>>,
    target: Target,
}

/// A non-owning reference to a promise, obtained from
/// [`Promise::downgrade`].
pub struct WeakPromise<T, E = PromiseError> {
    core: Weak<Core<T, E>>,
    target: Target,
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn with_outcome(target: &Target, outcome: Option<Result<T, E>>) -> Self {
        let work = outcome.is_none().then(WorkToken::enter);
        Self {
            core: Arc::new(Core {
                inner: Mutex::new(Inner {
                    outcome,
                    observers: SmallVec::new(),
                    draining: false,
                    work,
                }),
                settled: Condvar::new(),
            }),
            target: target.clone(),
        }
    }

    /// Creates a pending promise bound to the default target.
    ///
    /// The returned handle resolves the promise through [`fulfill`],
    /// [`reject`] or [`resolve`].
    ///
    /// [`fulfill`]: Promise::fulfill
    /// [`reject`]: Promise::reject
    /// [`resolve`]: Promise::resolve
    #[must_use]
    pub fn pending() -> Self {
        Self::pending_on(&Target::default())
    }

    /// Creates a pending promise bound to `target`.
    #[must_use]
    pub fn pending_on(target: &Target) -> Self {
        Self::with_outcome(target, None)
    }

    /// Creates a promise already fulfilled with `value`.
    #[must_use]
    pub fn fulfilled(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    /// Creates a promise already rejected with `error`.
    #[must_use]
    pub fn rejected(error: E) -> Self {
        Self::from_result(Err(error))
    }

    /// Creates a promise already resolved with `result`.
    #[must_use]
    pub fn from_result(result: Result<T, E>) -> Self {
        Self::with_outcome(&Target::default(), Some(result))
    }

    /// Returns a handle to the same promise whose continuations run on
    /// `target`.
    ///
    /// ```rust
    /// use promises::{Promise, Target};
    ///
    /// let promise = Promise::<i32>::fulfilled(1);
    /// let inline = promise.on(&Target::inline());
    /// assert!(inline.ptr_eq(&promise));
    /// ```
    #[must_use]
    pub fn on(&self, target: &Target) -> Self {
        Self {
            core: Arc::clone(&self.core),
            target: target.clone(),
        }
    }

    /// The target continuations registered through this handle run on.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Fulfills the promise. Returns `false` if it was already resolved.
    pub fn fulfill(&self, value: T) -> bool {
        self.resolve(Ok(value))
    }

    /// Rejects the promise. Returns `false` if it was already resolved.
    pub fn reject(&self, error: E) -> bool {
        self.resolve(Err(error))
    }

    /// Resolves the promise with `outcome`, fulfilling on `Ok` and rejecting
    /// on `Err`.
    ///
    /// The first resolution wins; later calls (from any thread) leave the
    /// promise untouched and return `false`. On success the pending
    /// observers are handed to their targets in registration order after the
    /// internal lock has been released, so a continuation may freely use the
    /// promise it observes.
    pub fn resolve(&self, outcome: Result<T, E>) -> bool {
        let mut batch = {
            let mut inner = self.core.inner.lock();
            if inner.outcome.is_some() {
                return false;
            }
            inner.outcome = Some(outcome.clone());
            inner.draining = true;
            mem::take(&mut inner.observers)
        };

        tracing::trace!(
            observers = batch.len(),
            fulfilled = outcome.is_ok(),
            "promise resolved"
        );

        loop {
            for observer in batch {
                observer.deliver(outcome.clone());
            }
            let mut inner = self.core.inner.lock();
            if inner.observers.is_empty() {
                inner.draining = false;
                self.core.settled.notify_all();
                drop(inner.work.take());
                return true;
            }
            batch = mem::take(&mut inner.observers);
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> State<T, E> {
        match &self.core.inner.lock().outcome {
            None => State::Pending,
            Some(Ok(value)) => State::Fulfilled(value.clone()),
            Some(Err(error)) => State::Rejected(error.clone()),
        }
    }

    /// Returns `true` while the promise is unresolved.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.core.inner.lock().outcome.is_none()
    }

    /// Returns `true` if the promise was fulfilled.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.core.inner.lock().outcome, Some(Ok(_)))
    }

    /// Returns `true` if the promise was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.core.inner.lock().outcome, Some(Err(_)))
    }

    /// The fulfillment value, if the promise was fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &self.core.inner.lock().outcome {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection error, if the promise was rejected.
    #[must_use]
    pub fn error(&self) -> Option<E> {
        match &self.core.inner.lock().outcome {
            Some(Err(error)) => Some(error.clone()),
            _ => None,
        }
    }

    /// Creates a [`WeakPromise`] that does not keep the promise alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakPromise<T, E> {
        WeakPromise {
            core: Arc::downgrade(&self.core),
            target: self.target.clone(),
        }
    }

    /// Returns `true` if both handles refer to the same promise, regardless
    /// of their targets.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Registers `callback` to run on this handle's target once the promise
    /// resolves.
    pub(crate) fn observe<F>(&self, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.observe_on(&self.target, callback);
    }

    /// Registers `callback` to run on `target` once the promise resolves.
    pub(crate) fn observe_on<F>(&self, target: &Target, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        let mut inner = self.core.inner.lock();
        let ready = if inner.draining {
            None
        } else {
            inner.outcome.clone()
        };
        match ready {
            Some(outcome) => {
                drop(inner);
                target.dispatch(move || callback(outcome));
            }
            None => inner.observers.push(Observer {
                target: target.clone(),
                callback: Box::new(callback),
            }),
        }
    }

    /// Forwards this promise's eventual resolution to `output`.
    pub(crate) fn pipe(&self, output: Self) {
        self.observe_on(&Target::inline(), move |outcome| {
            output.resolve(outcome);
        });
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            target: self.target.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.core.inner.lock().outcome {
            None => formatter.write_str("Pending"),
            Some(Ok(value)) => formatter.debug_tuple("Fulfilled").field(value).finish(),
            Some(Err(error)) => formatter.debug_tuple("Rejected").field(error).finish(),
        }
    }
}

impl<T, E> WeakPromise<T, E> {
    /// Returns a strong handle if the promise is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Promise<T, E>> {
        self.core.upgrade().map(|core| Promise {
            core,
            target: self.target.clone(),
        })
    }

    /// Returns `true` once the promise has been deallocated.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.core.strong_count() == 0
    }
}

impl<T, E> Clone for WeakPromise<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
            target: self.target.clone(),
        }
    }
}

impl<T, E> fmt::Debug for WeakPromise<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WeakPromise")
            .field("alive", &!self.is_dropped())
            .finish()
    }
}

static_assertions::assert_impl_all!(Promise<i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(WeakPromise<String>: Send, Sync, Clone);
