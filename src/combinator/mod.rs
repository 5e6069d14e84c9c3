//! Combinators that join several promises into one.
//!
//! | Combinator | Fulfills when | Rejects when |
//! |---|---|---|
//! | [`all`] | every input fulfilled | first input rejects |
//! | [`any`] / [`when`] | every input resolved, at least one fulfilled | every input rejected |
//! | [`race`] | first resolved input fulfilled | first resolved input rejected |
//! | [`Promise::reduce`](crate::Promise::reduce) | every step fulfilled | first step rejects |
//!
//! Every combinator has an `_on` variant that takes the [`Target`] its
//! bookkeeping continuations run on; the plain forms use
//! `Target::default()`. Results are always reported in input order, whatever
//! order the inputs complete in.
//!
//! Fixed-arity forms for 2 to 4 promises of different value types
//! ([`all2`], [`any3`], [`when4`], ...) follow the same rules and produce
//! tuples.
//!
//! [`Target`]: crate::Target

mod all;
mod any;
mod race;
mod reduce;
mod tuple;

pub use all::{all, all_on};
pub use any::{Maybe, When, any, any_on, when, when_on};
pub use race::{race, race_on};
pub use tuple::{
    all2, all2_on, all3, all3_on, all4, all4_on, any2, any2_on, any3, any3_on, any4, any4_on,
    when2, when2_on, when3, when3_on, when4, when4_on,
};
