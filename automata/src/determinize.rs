/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Standalone first-component determinizer: powerset construction
//! restricted to a supplied "to-determinize" set `T`, used both by the
//! two-component engine (`cut_det` case) and as its own
//! preprocessing pass (`seminize --determinize-first`-style usage).

use crate::automaton::{Automaton, Edge, ResultAutomaton, StateId, StateKind};
use crate::minterm::MintermIndexer;
use crate::powerset::PowersetBuilder;
use bit_set::BitSet;
use std::collections::{BTreeMap, BTreeSet};

/// Determinize the sub-automaton induced by `to_determinize`, copying every
/// other source state through unchanged.
#[must_use]
pub fn determinize_first_component(
    src: &Automaton,
    minterms: &MintermIndexer,
    to_determinize: &BTreeSet<StateId>,
) -> ResultAutomaton {
    let pb = PowersetBuilder::new(src, minterms);
    let filter: BitSet = to_determinize.iter().copied().collect();
    let no_mark = pb.no_mark();

    let mut ps2num: BTreeMap<BTreeSet<StateId>, StateId> = BTreeMap::new();
    let mut frontier: Vec<BTreeSet<StateId>> = Vec::new();
    let mut kinds: Vec<StateKind> = Vec::new();
    let mut states: Vec<Vec<Edge>> = Vec::new();

    let mut get_state = |ps: BTreeSet<StateId>,
                         ps2num: &mut BTreeMap<BTreeSet<StateId>, StateId>,
                         frontier: &mut Vec<BTreeSet<StateId>>,
                         kinds: &mut Vec<StateKind>,
                         states: &mut Vec<Vec<Edge>>|
     -> StateId {
        if let Some(&id) = ps2num.get(&ps) {
            return id;
        }
        let id = kinds.len();
        kinds.push(StateKind::FirstPowerset(ps.clone()));
        states.push(Vec::new());
        ps2num.insert(ps.clone(), id);
        frontier.push(ps);
        id
    };

    let init_ps: BTreeSet<StateId> = [src.initial()].into_iter().collect();
    let initial = get_state(init_ps, &mut ps2num, &mut frontier, &mut kinds, &mut states);

    // Powerset-explore within T.
    let mut next = 0;
    while next < frontier.len() {
        let ps = frontier[next].clone();
        let id = ps2num[&ps];
        next += 1;
        let succs = pb.successors(&ps, no_mark, Some(&filter), false);
        for (c, d_ps) in succs.into_iter().enumerate() {
            if d_ps.is_empty() {
                continue;
            }
            let dst = get_state(d_ps, &mut ps2num, &mut frontier, &mut kinds, &mut states);
            states[id].push(Edge::unmarked(dst, minterms.cond_of(c)));
        }
    }
    let first_component_len = states.len();

    // Copy every state outside T unchanged.
    let mut old2new: BTreeMap<StateId, StateId> = BTreeMap::new();
    for s in src.state_ids() {
        if to_determinize.contains(&s) {
            continue;
        }
        let id = kinds.len();
        kinds.push(StateKind::Reused(s));
        states.push(Vec::new());
        old2new.insert(s, id);
    }
    for s in src.state_ids() {
        if to_determinize.contains(&s) {
            continue;
        }
        let id = old2new[&s];
        for edge in src.edges(s) {
            crate::invariant!(
                !to_determinize.contains(&edge.dst),
                "edge from outside T must not re-enter T"
            );
            let dst = old2new[&edge.dst];
            states[id].push(Edge {
                dst,
                cond: edge.cond.clone(),
                acc: edge.acc.clone(),
            });
        }
    }

    // Bridge edges out of the first component, one per destination outside T.
    for id in 0..first_component_len {
        let ps = match &kinds[id] {
            StateKind::FirstPowerset(ps) => ps.clone(),
            _ => crate::never!(),
        };
        let succs = pb.successors(&ps, no_mark, Some(&filter), true);
        for (c, d_ps) in succs.into_iter().enumerate() {
            for s in d_ps {
                let dst = old2new[&s];
                states[id].push(Edge::unmarked(dst, minterms.cond_of(c)));
            }
        }
    }

    merge_parallel_edges(&mut states);

    ResultAutomaton {
        states,
        kinds,
        initial,
        num_marks: src.num_marks(),
        ap_names: src.ap_names().to_vec(),
    }
}

/// Merge edges sharing `(dst, acc)` by disjoining their conditions
/// ("merge parallel edges").
pub(crate) fn merge_parallel_edges(states: &mut [Vec<Edge>]) {
    for edges in states.iter_mut() {
        let mut merged: BTreeMap<(StateId, BTreeSet<usize>), Edge> = BTreeMap::new();
        for edge in edges.drain(..) {
            let key = (edge.dst, edge.acc.clone());
            merged
                .entry(key)
                .and_modify(|existing| existing.cond = existing.cond.or(&edge.cond))
                .or_insert(edge);
        }
        *edges = merged.into_values().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> (Automaton, MintermIndexer) {
        // 0 --a--> 1, 1 --a--> 1 (to determinize {0, 1}), 1 --b--> 2 (outside T)
        let idx = MintermIndexer::new(&["a".to_owned(), "b".to_owned()]).unwrap();
        let a = idx.bdd_vars().mk_var(idx.bdd_vars().var_by_name("a").unwrap());
        let b = idx.bdd_vars().mk_var(idx.bdd_vars().var_by_name("b").unwrap());
        let edges = vec![
            vec![Edge::unmarked(1, a.clone())],
            vec![Edge::unmarked(1, a), Edge::unmarked(2, b.clone())],
            vec![Edge::unmarked(2, b)],
        ];
        (Automaton::new(edges, 0, 0, vec!["a".into(), "b".into()]), idx)
    }

    #[test]
    fn copies_non_determinized_states_and_bridges_out() {
        let (src, idx) = tiny();
        let to_determinize: BTreeSet<StateId> = [0, 1].into_iter().collect();
        let result = determinize_first_component(&src, &idx, &to_determinize);
        assert!(matches!(result.kinds[result.initial], StateKind::FirstPowerset(_)));
        assert!(result.kinds.iter().any(|k| matches!(k, StateKind::Reused(2))));
    }

    #[test]
    fn determinizing_everything_still_terminates() {
        let (src, idx) = tiny();
        let to_determinize: BTreeSet<StateId> = src.state_ids().collect();
        let result = determinize_first_component(&src, &idx, &to_determinize);
        assert!(result.num_states() >= 1);
    }
}
