use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::Target;
use crate::promise::Promise;

struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

/// Waits for every promise to fulfill.
///
/// See [`all_on`].
pub fn all<T, E, I>(promises: I) -> Promise<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    all_on(&Target::default(), promises)
}

/// Waits for every promise to fulfill, running the bookkeeping on `target`.
///
/// The returned promise fulfills with the values in input order once all
/// inputs have fulfilled. It rejects as soon as any input rejects, with that
/// input's error; the remaining inputs keep running but no longer affect the
/// result. An empty input fulfills immediately with an empty vector.
///
/// # Examples
///
/// ```rust
/// use promises::{Promise, all};
///
/// let first = Promise::<i32>::pending();
/// let second = Promise::<i32>::pending();
/// let joined = all([first.clone(), second.clone()]);
///
/// second.fulfill(2);
/// first.fulfill(1);
/// assert_eq!(joined.wait(), Ok(vec![1, 2]));
/// ```
pub fn all_on<T, E, I>(target: &Target, promises: I) -> Promise<Vec<T>, E>
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
    }));

    for (index, promise) in promises.iter().enumerate() {
        let gather = Arc::clone(&gather);
        let sink = output.clone();
        promise.observe_on(target, move |outcome| match outcome {
            Ok(value) => {
                let values = {
                    let mut gather = gather.lock();
                    gather.slots[index] = Some(value);
                    gather.remaining -= 1;
                    if gather.remaining > 0 {
                        return;
                    }
                    gather.slots.drain(..).flatten().collect::<Vec<_>>()
                };
                sink.fulfill(values);
            }
            Err(error) => {
                if sink.reject(error) {
                    tracing::trace!(index, "all rejected by input");
                }
            }
        });
    }
    output
}
