//! `async` integration: awaiting promises from tokio tasks.

use promises::{ConcurrentQueue, Promise, PromiseError, Target, all};
use rstest::rstest;
use std::thread;
use std::time::Duration;

/// Awaiting an already resolved promise completes immediately.
#[rstest]
#[tokio::test]
async fn test_await_resolved_promise() {
    assert_eq!(Promise::<i32>::fulfilled(42).await, Ok(42));
    assert_eq!(
        Promise::<i32>::rejected(PromiseError::TimedOut).await,
        Err(PromiseError::TimedOut)
    );
}

/// A current-thread runtime is not blocked while a promise is pending.
#[rstest]
#[tokio::test]
async fn test_await_does_not_block_current_thread_runtime() {
    let promise = Promise::<i32>::pending();
    let resolver = promise.clone();

    let background = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        resolver.fulfill(7);
    });

    assert_eq!(promise.await, Ok(7));
    background.await.unwrap();
}

/// Library timers keep working inside a current-thread runtime.
#[rstest]
#[tokio::test]
async fn test_await_timeout_inside_runtime() {
    let bounded = Promise::<i32>::pending().timeout(Duration::from_millis(20));
    assert_eq!(bounded.await, Err(PromiseError::TimedOut));
}

/// Combinators compose with `await`.
#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_await_combinator_on_concurrent_queue() {
    let queue = Target::new(ConcurrentQueue::new("test.async"));
    let inputs: Vec<_> = (1..=4)
        .map(|value| {
            Promise::<i32>::spawn_on(&queue, move || {
                thread::sleep(Duration::from_millis(5));
                Ok(value)
            })
        })
        .collect();

    assert_eq!(all(inputs).await, Ok(vec![1, 2, 3, 4]));
}
