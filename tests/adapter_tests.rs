//! Construction adapter tests: work closures and completion-handler wrappers.

use promises::{
    Promise, PromiseError, Target, Wrap, wrap, wrap_error_optional_value, wrap_error_value,
    wrap_optional_value_error, wrap_result, wrap_unit, wrap_value_error,
};
use rstest::rstest;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum TestError {
    #[error("code 13")]
    Code13,
    #[error(transparent)]
    Promise(#[from] PromiseError),
}

/// Simulates an asynchronous API reporting through a completion handler.
fn legacy_async<F>(completion: F)
where
    F: FnOnce() + Send + 'static,
{
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        completion();
    });
}

// =============================================================================
// Work Closure Tests
// =============================================================================

/// The resolver may outlive the work closure.
#[rstest]
fn test_new_resolves_asynchronously() {
    let promise = Promise::<i32, TestError>::new(|resolver| {
        legacy_async(move || {
            resolver.fulfill(42);
        });
        Ok(())
    });

    assert_eq!(promise.wait(), Ok(42));
}

/// An error returned synchronously by the work closure rejects the promise.
#[rstest]
fn test_new_synchronous_error_rejects() {
    let promise = Promise::<i32, TestError>::new(|_resolver| Err(TestError::Code13));
    assert_eq!(promise.wait(), Err(TestError::Code13));
}

/// Losing every resolver rejects instead of hanging.
#[rstest]
fn test_new_lost_resolver_rejects() {
    let promise = Promise::<i32, TestError>::new(|resolver| {
        thread::spawn(move || drop(resolver));
        Ok(())
    });

    assert_eq!(
        promise.wait(),
        Err(TestError::Promise(PromiseError::ResolverDropped))
    );
}

/// `spawn` runs the closure on the target and resolves with its result.
#[rstest]
#[case(Ok(7))]
#[case(Err(TestError::Code13))]
fn test_spawn_resolves_with_result(#[case] outcome: Result<i32, TestError>) {
    let expected = outcome.clone();
    let promise = Promise::spawn(move || outcome);
    assert_eq!(promise.wait(), expected);
}

// =============================================================================
// wrap Tests
// =============================================================================

/// `wrap_unit` fulfills once the completion is called.
#[rstest]
fn test_wrap_unit() {
    let promise = wrap_unit::<TestError, _>(|done| {
        legacy_async(done);
        Ok(())
    });
    assert_eq!(promise.wait(), Ok(()));
}

/// `wrap` forwards the completion's value, including optional values.
#[rstest]
fn test_wrap_value_and_optional_value() {
    let value = wrap::<i32, TestError, _>(|completion| {
        legacy_async(move || completion(42));
        Ok(())
    });
    let optional = wrap::<Option<i32>, TestError, _>(|completion| {
        legacy_async(move || completion(None));
        Ok(())
    });

    assert_eq!(value.wait(), Ok(42));
    assert_eq!(optional.wait(), Ok(None));
}

/// `wrap_result` resolves from a `Result` completion.
#[rstest]
fn test_wrap_result() {
    let promise = wrap_result::<i32, TestError, _>(|completion| {
        legacy_async(move || completion(Err(TestError::Code13)));
        Ok(())
    });
    assert_eq!(promise.wait(), Err(TestError::Code13));
}

/// The error wins when a completion reports both a value and an error.
#[rstest]
#[case(None, Ok(1))]
#[case(Some(TestError::Code13), Err(TestError::Code13))]
fn test_wrap_value_and_error_orders(
    #[case] error: Option<TestError>,
    #[case] expected: Result<i32, TestError>,
) {
    let error_for_reversed = error.clone();
    let forward = wrap_value_error(move |completion| {
        legacy_async(move || completion(1, error));
        Ok(())
    });
    let reversed = wrap_error_value(move |completion| {
        legacy_async(move || completion(error_for_reversed, 1));
        Ok(())
    });

    assert_eq!(forward.wait(), expected);
    assert_eq!(reversed.wait(), expected);
}

/// Optional value adapters keep `None` as a fulfillment.
#[rstest]
#[case(Some(5), None, Ok(Some(5)))]
#[case(None, None, Ok(None))]
#[case(Some(5), Some(TestError::Code13), Err(TestError::Code13))]
fn test_wrap_optional_value_adapters(
    #[case] value: Option<i32>,
    #[case] error: Option<TestError>,
    #[case] expected: Result<Option<i32>, TestError>,
) {
    let error_for_reversed = error.clone();
    let forward = wrap_optional_value_error(move |completion| {
        legacy_async(move || completion(value, error));
        Ok(())
    });
    let reversed = wrap_error_optional_value(move |completion| {
        legacy_async(move || completion(error_for_reversed, value));
        Ok(())
    });

    assert_eq!(forward.wait(), expected);
    assert_eq!(reversed.wait(), expected);
}

/// A dropped completion rejects with `ResolverDropped`.
#[rstest]
fn test_wrap_dropped_completion_rejects() {
    let promise = wrap::<i32, TestError, _>(|completion| {
        drop(completion);
        Ok(())
    });
    assert_eq!(
        promise.wait(),
        Err(TestError::Promise(PromiseError::ResolverDropped))
    );
}

/// `Wrap::on` invokes the adapted function on the chosen target.
#[rstest]
fn test_wrap_on_target() {
    let queue = Target::new(promises::DispatchQueue::new("test.wrap"));
    let promise = Wrap::on(&queue).value::<String, TestError, _>(|completion| {
        completion(thread::current().name().unwrap_or_default().to_owned());
        Ok(())
    });

    assert_eq!(promise.wait(), Ok("test.wrap".to_owned()));
}
