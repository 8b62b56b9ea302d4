/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Cut-determinism checker: classifies every SCC as `IN_CUT`,
//! `NOT_IN_CUT`, or (transiently) `UNKNOWN`, and reports the states whose
//! SCC isn't `IN_CUT`.

use crate::automaton::{Automaton, Edge, StateId};
use crate::scc::{SccId, SccOracle};
use biodivine_lib_bdd::Bdd;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Cut {
    Unknown,
    InCut,
    NotInCut,
}

/// Whether `s`'s outgoing edges passing `allow` are pairwise disjoint.
fn state_is_deterministic(src: &Automaton, s: StateId, allow: impl Fn(&Edge) -> bool) -> bool {
    let mut seen: Option<Bdd> = None;
    for edge in src.edges(s) {
        if !allow(edge) {
            continue;
        }
        match &seen {
            Some(acc) => {
                if !edge.cond.and(acc).is_false() {
                    return false;
                }
                seen = Some(edge.cond.or(acc));
            }
            None => seen = Some(edge.cond.clone()),
        }
    }
    true
}

/// `(is_cd, non_det_states)`: whether `src` is cut-deterministic and,
/// if not, the states belonging to its non-deterministic (not `IN_CUT`)
/// SCCs.
#[must_use]
pub fn is_cut_deterministic(src: &Automaton, oracle: &SccOracle) -> (bool, BTreeSet<StateId>) {
    let n = oracle.num_sccs();
    let mut cut = vec![Cut::Unknown; n];
    let mut reachable_from_acc = vec![false; n];
    let mut is_cd = true;

    // Pass 1, forward topological order (ancestors before descendants):
    // mark every SCC that is accepting, or reachable from one, as IN_CUT,
    // and propagate `reachable_from_acc` one hop onto its successors.
    let forward_order: Vec<SccId> = oracle.bottom_up_order().iter().rev().copied().collect();
    for scc in forward_order {
        if oracle.is_accepting(scc) || reachable_from_acc[scc] {
            cut[scc] = Cut::InCut;
            for &succ in oracle.successor_sccs(scc) {
                reachable_from_acc[succ] = true;
            }
            if !oracle.is_deterministic_scc(src, scc, false) {
                is_cd = false;
            }
        }
    }

    // Pass 2, reverse topological order (descendants before ancestors):
    // classify the remaining SCCs, whose determinism depends on whether
    // their boundary leads back into the cut.
    for &scc in oracle.bottom_up_order() {
        if matches!(cut[scc], Cut::InCut) {
            continue;
        }

        if !oracle.is_deterministic_scc(src, scc, true) {
            is_cd = false;
        }

        let mut edge_states = BTreeSet::new();
        for &s in oracle.states_of(scc) {
            if src.edges(s).iter().any(|e| oracle.scc_of(e.dst) != scc) {
                edge_states.insert(s);
            }
        }

        if oracle
            .successor_sccs(scc)
            .iter()
            .any(|&succ| cut[succ] == Cut::NotInCut)
        {
            cut[scc] = Cut::NotInCut;
        }

        match cut[scc] {
            Cut::Unknown => {
                let is_in_cut = edge_states
                    .iter()
                    .all(|&s| state_is_deterministic(src, s, |_| true));
                cut[scc] = if is_in_cut { Cut::InCut } else { Cut::NotInCut };
            }
            Cut::NotInCut if is_cd => {
                let boundary_det = edge_states.iter().all(|&s| {
                    state_is_deterministic(src, s, |e| cut[oracle.scc_of(e.dst)] != Cut::InCut)
                });
                if !boundary_det {
                    is_cd = false;
                }
            }
            Cut::NotInCut | Cut::InCut => {}
        }
    }

    let mut non_det_states = BTreeSet::new();
    for scc in 0..n {
        if cut[scc] != Cut::InCut {
            non_det_states.extend(oracle.states_of(scc).iter().copied());
        }
    }
    (is_cd, non_det_states)
}
