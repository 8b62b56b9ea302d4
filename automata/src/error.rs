/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Recoverable errors: the ones reported to the caller rather than
//! treated as programming-error invariant violations.
//!
//! Invariant violations (an empty `R` in a breakpoint, a state-map
//! disjointness failure, a post-build cut-determinism check failure) are
//! not represented here; they panic via the `invariant!`/`unwrap!` macros
//! in [`crate`], since the spec treats them as bugs, not recoverable input.

use thiserror::Error;

/// Recoverable failure of a [`crate::Automaton`]-consuming operation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// The input automaton is not a generalized Buchi automaton (some edge's
    /// acceptance mark set referenced a mark `>= k`, or no acceptance was
    /// declared at all for an automaton that needs one).
    #[error("input is not a generalized Buchi automaton: {0}")]
    NotGeneralizedBuchi(String),

    /// `2^|AP|` would overflow the index space the minterm indexer and
    /// powerset bitvector caches use.
    #[error("{aps} atomic propositions would need 2^{aps} = {count} minterms, too many to index")]
    TooManyAtomicPropositions {
        /// Number of atomic propositions requested.
        aps: u32,
        /// `2^aps`, already known to overflow or exceed the configured cap.
        count: u64,
    },

    /// Source and result automata were built from incompatible Boolean-expression dictionaries.
    #[error("source and result automata use incompatible BDD dictionaries")]
    DictionaryMismatch,
}
