//! Errors raised by the library itself.
//!
//! Domain errors travel through promises as the caller's own error type `E`.
//! The library only ever produces the handful of conditions listed in
//! [`PromiseError`], and only from the operations that document them:
//!
//! | Variant | Raised by |
//! |---|---|
//! | [`PromiseError::TimedOut`] | [`Promise::timeout`](crate::Promise::timeout) |
//! | [`PromiseError::ValidationFailure`] | [`Promise::validate`](crate::Promise::validate) |
//! | [`PromiseError::ResolverDropped`] | [`Promise::new`](crate::Promise::new) and the [`wrap`](mod@crate::wrap) adapters |
//! | [`PromiseError::Panicked`] | any operator whose closure panics |
//!
//! Operations that can raise one of these require `E: From<PromiseError>`, so
//! an application error enum typically carries a `#[from] PromiseError`
//! variant:
//!
//! ```rust
//! use promises::PromiseError;
//!
//! #[derive(Debug, Clone, PartialEq, thiserror::Error)]
//! enum AppError {
//!     #[error("not found")]
//!     NotFound,
//!     #[error(transparent)]
//!     Promise(#[from] PromiseError),
//! }
//!
//! let error: AppError = PromiseError::TimedOut.into();
//! assert_eq!(error, AppError::Promise(PromiseError::TimedOut));
//! ```

use thiserror::Error;

/// Library-originated rejection reasons.
///
/// Variants are plain tags, so they compare with `==` and can be matched in
/// `catch`/`recover` handlers to tell library failures apart from domain
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PromiseError {
    /// The promise did not resolve before the interval given to `timeout`.
    #[error("promise timed out")]
    TimedOut,

    /// The predicate given to `validate` returned `false`.
    #[error("promise value failed validation")]
    ValidationFailure,

    /// Every resolver for a pending promise was dropped without resolving it.
    ///
    /// Produced by work-closure constructors and completion-handler adapters
    /// when the completion capability is lost, which would otherwise leave
    /// the promise pending forever.
    #[error("resolver dropped before the promise was resolved")]
    ResolverDropped,

    /// A closure run on behalf of the promise panicked.
    ///
    /// The panic is logged with its message and the promise the closure was
    /// computing is rejected with this variant.
    #[error("promise callback panicked")]
    Panicked,
}
