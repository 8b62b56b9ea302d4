/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Property tests, run with `quickcheck`.
//!
//! These generate their own inputs from plain `u8`/`Vec<u8>` rather than
//! through [`crate::automaton::Breakpoint`]'s `Arbitrary` impl, so they run
//! under the default `cargo test` instead of requiring the optional
//! `quickcheck` feature (which exists to let downstream consumers generate
//! [`Breakpoint`](crate::automaton::Breakpoint) values themselves).

use crate::minterm::MintermIndexer;
use quickcheck_macros::quickcheck;
use std::collections::BTreeSet;

#[quickcheck]
fn every_constructed_breakpoint_is_well_formed(seed: u8, extra: Vec<u8>, level: u8) -> bool {
    let universe: BTreeSet<usize> = std::iter::once(usize::from(seed))
        .chain(extra.into_iter().map(usize::from))
        .collect();
    let r = universe.clone();
    let b: BTreeSet<usize> = universe.into_iter().filter(|s| s % 2 == 0).collect();
    let level = usize::from(level) % 3;
    let bp = crate::automaton::Breakpoint { r, b, level };
    bp.is_well_formed(3)
}

#[quickcheck]
fn minterm_index_of_cond_of_is_identity(c: u8) -> bool {
    let idx = MintermIndexer::new(&["a".to_owned(), "b".to_owned(), "c".to_owned()]).unwrap();
    let c = usize::from(c) % idx.num_of_conds();
    idx.index_of(&idx.cond_of(c)) == Some(c)
}

#[quickcheck]
fn minterms_of_a_single_minterms_condition_is_a_singleton(c: u8) -> bool {
    let idx = MintermIndexer::new(&["a".to_owned(), "b".to_owned()]).unwrap();
    let c = usize::from(c) % idx.num_of_conds();
    let covered: Vec<usize> = idx.minterms_of(&idx.cond_of(c)).collect();
    covered == [c]
}
