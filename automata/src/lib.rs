/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Transforms a transition-based generalized Buchi automaton (TGBA) into an
//! equivalent semi-deterministic or cut-deterministic Buchi automaton.
//!
//! This crate is the engine only: it knows nothing about files, command-line
//! flags, or the HOA text format. Those live in the `seminize` binary crate,
//! which drives this one through [`Automaton`], [`Options`], and [`engine::build`].

#![allow(unknown_lints)]
#![warn(clippy::all, clippy::perf, elided_lifetimes_in_paths)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

/// Unwrap if we're debugging but `unwrap_unchecked` if we're not.
///
/// Reserved for internal consistency invariants (state-map disjointness,
/// an empty `R` in a breakpoint, a post-build cut-determinism check, ...):
/// these are programming errors that abort the engine rather than
/// recoverable results, so there is no `Result` to thread through.
#[cfg(any(debug_assertions, test))]
macro_rules! unwrap {
    ($expr:expr) => {
        $expr.unwrap()
    };
}
#[cfg(not(any(debug_assertions, test)))]
macro_rules! unwrap {
    ($expr:expr) => {{
        #[allow(unsafe_code)]
        let result = unsafe { $expr.unwrap_unchecked() };
        result
    }};
}

/// Assert an engine invariant; panics (rather than returning an error) when violated.
macro_rules! invariant {
    ($cond:expr, $($msg:tt)*) => {
        assert!($cond, $($msg)*)
    };
}

/// A branch we believe is unreachable because an invariant guarantees it.
macro_rules! never {
    () => {
        unreachable!("engine invariant violated")
    };
}

pub(crate) use invariant;
pub(crate) use never;
pub(crate) use unwrap;

pub mod automaton;
pub mod cutdet;
pub mod determinize;
pub mod engine;
mod error;
pub mod minterm;
pub mod ncsb;
pub mod powerset;
pub mod scc;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;

pub use automaton::{Acceptance, Automaton, Edge, StateKind};
pub use engine::{build, Options};
pub use error::Error;
pub use minterm::MintermIndexer;
