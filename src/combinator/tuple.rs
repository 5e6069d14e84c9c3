//! Fixed-arity combinators over promises with different value types.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Maybe;
use crate::dispatch::Target;
use crate::promise::Promise;

struct Gather<S> {
    slots: S,
    remaining: usize,
    fulfilled: bool,
}

impl<S> Gather<S> {
    fn new(slots: S, remaining: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            slots,
            remaining,
            fulfilled: false,
        }))
    }
}

macro_rules! tuple_combinators {
    ($arity:literal => $($value:ident $input:ident $index:tt),+) => {
        paste::paste! {
            #[doc = concat!("Waits for ", stringify!($arity), " promises of different types to fulfill.")]
            ///
            /// Tuple form of [`all`](super::all); uses the default target.
            pub fn [<all $arity>]<$($value,)+ E>(
                $($input: &Promise<$value, E>),+
            ) -> Promise<($($value,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                [<all $arity _on>](&Target::default(), $($input),+)
            }

            #[doc = concat!("Waits for ", stringify!($arity), " promises of different types to fulfill, running the bookkeeping on `target`.")]
            ///
            /// Fulfills with the values as a tuple once every input fulfilled;
            /// rejects with the first rejection.
            pub fn [<all $arity _on>]<$($value,)+ E>(
                target: &Target,
                $($input: &Promise<$value, E>),+
            ) -> Promise<($($value,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                fn complete<$($value),+>(
                    slots: &mut ($(Option<$value>,)+),
                ) -> Option<($($value,)+)> {
                    match ($(slots.$index.take(),)+) {
                        ($(Some($input),)+) => Some(($($input,)+)),
                        _ => None,
                    }
                }

                let output = Promise::pending_on(target);
                let gather = Gather::new(($(None::<$value>,)+), $arity);
                $(
                    let state = Arc::clone(&gather);
                    let sink = output.clone();
                    $input.observe_on(target, move |outcome| match outcome {
                        Ok(value) => {
                            let values = {
                                let mut state = state.lock();
                                state.slots.$index = Some(value);
                                state.remaining -= 1;
                                if state.remaining > 0 {
                                    return;
                                }
                                complete(&mut state.slots)
                            };
                            if let Some(values) = values {
                                sink.fulfill(values);
                            }
                        }
                        Err(error) => {
                            sink.reject(error);
                        }
                    });
                )+
                output
            }

            #[doc = concat!("Waits for ", stringify!($arity), " promises of different types to resolve, tolerating partial failure.")]
            ///
            /// Tuple form of [`any`](super::any); uses the default target.
            pub fn [<any $arity>]<$($value,)+ E>(
                $($input: &Promise<$value, E>),+
            ) -> Promise<($(Maybe<$value, E>,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                [<any $arity _on>](&Target::default(), $($input),+)
            }

            #[doc = concat!("Waits for ", stringify!($arity), " promises of different types to resolve, running the bookkeeping on `target`.")]
            ///
            /// Fulfills with one [`Maybe`] per input unless every input
            /// rejected, in which case it rejects with the last error.
            pub fn [<any $arity _on>]<$($value,)+ E>(
                target: &Target,
                $($input: &Promise<$value, E>),+
            ) -> Promise<($(Maybe<$value, E>,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                fn complete<$($value,)+ E>(
                    slots: &mut ($(Option<Maybe<$value, E>>,)+),
                ) -> Option<($(Maybe<$value, E>,)+)> {
                    match ($(slots.$index.take(),)+) {
                        ($(Some($input),)+) => Some(($($input,)+)),
                        _ => None,
                    }
                }

                let output = Promise::pending_on(target);
                let gather = Gather::new(($(None::<Maybe<$value, E>>,)+), $arity);
                $(
                    let state = Arc::clone(&gather);
                    let sink = output.clone();
                    $input.observe_on(target, move |outcome| {
                        let error = outcome.as_ref().err().cloned();
                        let values = {
                            let mut state = state.lock();
                            state.slots.$index = Some(Maybe::from(outcome));
                            state.fulfilled |= error.is_none();
                            state.remaining -= 1;
                            if state.remaining > 0 {
                                return;
                            }
                            if state.fulfilled {
                                complete(&mut state.slots)
                            } else {
                                None
                            }
                        };
                        match (values, error) {
                            (Some(values), _) => {
                                sink.fulfill(values);
                            }
                            (None, Some(error)) => {
                                sink.reject(error);
                            }
                            (None, None) => {}
                        }
                    });
                )+
                output
            }

            #[doc = concat!("Same as [`any", stringify!($arity), "`].")]
            pub fn [<when $arity>]<$($value,)+ E>(
                $($input: &Promise<$value, E>),+
            ) -> Promise<($(Maybe<$value, E>,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                [<any $arity>]($($input),+)
            }

            #[doc = concat!("Same as [`any", stringify!($arity), "_on`].")]
            pub fn [<when $arity _on>]<$($value,)+ E>(
                target: &Target,
                $($input: &Promise<$value, E>),+
            ) -> Promise<($(Maybe<$value, E>,)+), E>
            where
                $($value: Clone + Send + 'static,)+
                E: Clone + Send + 'static,
            {
                [<any $arity _on>](target, $($input),+)
            }
        }
    };
}

tuple_combinators!(2 => A first 0, B second 1);
tuple_combinators!(3 => A first 0, B second 1, C third 2);
tuple_combinators!(4 => A first 0, B second 1, C third 2, D fourth 3);
