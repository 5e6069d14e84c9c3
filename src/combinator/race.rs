use crate::dispatch::Target;
use crate::promise::Promise;

/// Adopts the resolution of whichever promise resolves first.
///
/// See [`race_on`].
///
/// # Panics
///
/// Panics if `promises` is empty.
pub fn race<T, E, I>(promises: I) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    race_on(&Target::default(), promises)
}

/// Adopts the resolution of whichever promise resolves first, running the
/// bookkeeping on `target`.
///
/// Later resolutions are ignored. An input that is already resolved when
/// `race_on` is called wins immediately.
///
/// # Panics
///
/// Panics if `promises` is empty: such a race could never resolve.
pub fn race_on<T, E, I>(target: &Target, promises: I) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    assert!(!promises.is_empty(), "race requires at least one promise");

    let output = Promise::pending_on(target);
    for promise in &promises {
        let sink = output.clone();
        promise.observe_on(target, move |outcome| {
            sink.resolve(outcome);
        });
    }
    output
}
