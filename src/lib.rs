//! # promises
//!
//! Thread-safe promises: single-assignment containers for the eventual
//! result of an asynchronous computation, with a library of operators and
//! combinators for composing them.
//!
//! ## Overview
//!
//! - **Promise core**: [`Promise`] is created pending or already resolved and
//!   is resolved exactly once, fulfilled with a value or rejected with an
//!   error, even when several threads race to resolve it.
//! - **Chaining**: `then`, `and_then`, `catch`, `recover`, `always`,
//!   `validate`, `delay` and `timeout` each derive a new promise.
//! - **Combinators**: [`all`], [`any`], [`when`], [`race`] and
//!   [`Promise::reduce`], plus tuple forms for 2 to 4 promises.
//! - **Retry**: [`retry`] re-runs failing work according to a [`RetryPolicy`].
//! - **Adapters**: [`Promise::new`], [`Promise::spawn`] and the `wrap_*`
//!   functions turn closures and completion-callback APIs into promises.
//! - **Dispatch**: continuations run on a [`DispatchTarget`]; the crate
//!   ships a serial [`DispatchQueue`], a [`ConcurrentQueue`] and [`Inline`].
//!   [`wait_for_promises`] waits until every scheduled continuation has run.
//!
//! ## Feature Flags
//!
//! - `serde`: `Deserialize` for [`Config`], `Serialize`/`Deserialize` for
//!   [`Maybe`] and [`PromiseError`].
//!
//! ## Example
//!
//! ```rust
//! use promises::prelude::*;
//! use std::time::Duration;
//!
//! let left = Promise::<i32>::spawn(|| Ok(20));
//! let right = Promise::<i32>::spawn(|| Ok(22));
//!
//! let sum = all([left, right])
//!     .then(|values| Ok(values.iter().sum::<i32>()))
//!     .timeout(Duration::from_secs(5));
//!
//! assert_eq!(sum.wait(), Ok(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use promises::prelude::*;
/// ```
pub mod prelude {
    pub use crate::combinator::*;
    pub use crate::dispatch::{ConcurrentQueue, DispatchQueue, DispatchTarget, Inline, Target};
    pub use crate::error::PromiseError;
    pub use crate::promise::{Promise, Resolver, State};
    pub use crate::retry::{RetryPolicy, retry};
}

pub mod combinator;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod promise;
pub mod retry;
pub mod wrap;

pub use combinator::{
    Maybe, When, all, all_on, all2, all2_on, all3, all3_on, all4, all4_on, any, any_on, any2,
    any2_on, any3, any3_on, any4, any4_on, race, race_on, when, when_on, when2, when2_on, when3,
    when3_on, when4, when4_on,
};
pub use config::{Config, ConfigError};
pub use dispatch::{
    ConcurrentQueue, DispatchQueue, DispatchTarget, Inline, Job, QueueError, Target, run_job,
    wait_for_promises,
};
pub use error::PromiseError;
pub use promise::{Promise, PromiseFuture, Resolver, State, WeakPromise};
pub use retry::{RetryPolicy, retry};
pub use wrap::{
    Completion, Completion2, Wrap, wrap, wrap_error_optional_value, wrap_error_value,
    wrap_optional_value_error, wrap_result, wrap_unit, wrap_value_error,
};
