//! Blocking waits and `async` integration.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::task::AtomicWaker;
use parking_lot::Mutex;

use super::Promise;
use crate::dispatch::Target;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Blocks the calling thread until the promise resolves and returns its
    /// resolution.
    ///
    /// Do not call this from a job running on the target the promise is
    /// waiting on: a serial queue cannot resolve work queued behind the
    /// blocked job.
    pub fn wait(&self) -> Result<T, E> {
        let mut inner = self.core.inner.lock();
        if let Some(outcome) = &inner.outcome {
            return outcome.clone();
        }
        loop {
            self.core.settled.wait(&mut inner);
            if let Some(outcome) = inner.delivered() {
                return outcome;
            }
        }
    }

    /// Like [`wait`](Promise::wait), but gives up after `timeout`.
    ///
    /// Returns `None` if the promise is still pending when the time is up.
    /// Waiting registers nothing on the promise, so polling in a loop is
    /// fine.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, E>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.core.inner.lock();
        if let Some(outcome) = &inner.outcome {
            return Some(outcome.clone());
        }
        loop {
            if self.core.settled.wait_until(&mut inner, deadline).timed_out() {
                return inner.outcome.clone();
            }
            if let Some(outcome) = inner.delivered() {
                return Some(outcome);
            }
        }
    }
}

struct Shared<T, E> {
    outcome: Mutex<Option<Result<T, E>>>,
    waker: AtomicWaker,
}

/// Future returned by awaiting a [`Promise`].
///
/// The continuation that completes the future is registered on first poll.
#[must_use = "futures do nothing unless polled"]
pub struct PromiseFuture<T, E> {
    promise: Promise<T, E>,
    shared: Option<Arc<Shared<T, E>>>,
}

impl<T, E> Future for PromiseFuture<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let Self { promise, shared } = self.get_mut();
        let shared = shared.get_or_insert_with(|| {
            let shared = Arc::new(Shared {
                outcome: Mutex::new(None),
                waker: AtomicWaker::new(),
            });
            let sink = Arc::clone(&shared);
            promise.observe_on(&Target::inline(), move |outcome| {
                *sink.outcome.lock() = Some(outcome);
                sink.waker.wake();
            });
            shared
        });

        shared.waker.register(context.waker());
        shared
            .outcome
            .lock()
            .take()
            .map_or(Poll::Pending, Poll::Ready)
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = PromiseFuture<T, E>;

    /// Awaits the resolution without blocking the executor.
    ///
    /// ```rust
    /// use promises::Promise;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let promise = Promise::<i32>::spawn(|| Ok(6 * 7));
    /// assert_eq!(promise.await, Ok(42));
    /// # });
    /// ```
    fn into_future(self) -> Self::IntoFuture {
        PromiseFuture {
            promise: self,
            shared: None,
        }
    }
}
