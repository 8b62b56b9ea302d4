/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! SCC oracle: wraps the input's SCC decomposition (delegated to
//! `petgraph`, treated as an external collaborator) and derives the `avoid`
//! predicate bottom-up over reverse topological order.

use crate::automaton::{Automaton, StateId};
use biodivine_lib_bdd::Bdd;
use petgraph::algo::{condensation, toposort};
use petgraph::graph::DiGraph;
use std::collections::BTreeSet;

/// Id of a strongly connected component, indexing the vectors below.
pub type SccId = usize;

/// Wraps an automaton's SCC decomposition and the `avoid` predicate.
#[derive(Debug)]
pub struct SccOracle {
    scc_of: Vec<SccId>,
    states_of: Vec<BTreeSet<StateId>>,
    succ_sccs: Vec<BTreeSet<SccId>>,
    accepting: Vec<bool>,
    weak: Vec<bool>,
    avoid: Vec<bool>,
    /// SCCs in reverse topological order (successors before predecessors).
    bottom_up_order: Vec<SccId>,
}

impl SccOracle {
    /// Decompose `src` into SCCs and compute every derived predicate.
    #[must_use]
    pub fn new(src: &Automaton) -> Self {
        let mut graph = DiGraph::<StateId, ()>::new();
        for s in src.state_ids() {
            let idx = graph.add_node(s);
            debug_assert_eq!(idx.index(), s, "node indices must coincide with state ids");
        }
        for s in src.state_ids() {
            for edge in src.edges(s) {
                graph.add_edge((s).into(), edge.dst.into(), ());
            }
        }

        let condensed = condensation(graph, true);
        let n_sccs = condensed.node_count();
        let mut scc_of = vec![0; src.num_states()];
        let mut states_of = vec![BTreeSet::new(); n_sccs];
        for idx in condensed.node_indices() {
            let members: BTreeSet<StateId> = condensed[idx].iter().copied().collect();
            for &s in &members {
                scc_of[s] = idx.index();
            }
            states_of[idx.index()] = members;
        }

        let mut succ_sccs = vec![BTreeSet::new(); n_sccs];
        for edge in condensed.edge_indices() {
            let (a, b) = condensed.edge_endpoints(edge).expect("edge exists");
            if a != b {
                succ_sccs[a.index()].insert(b.index());
            }
        }

        let mut order = toposort(&condensed, None)
            .expect("condensation(make_acyclic = true) always yields a DAG")
            .into_iter()
            .map(|idx| idx.index())
            .collect::<Vec<_>>();
        order.reverse();

        let accepting = (0..n_sccs)
            .map(|scc| Self::compute_accepting(src, &states_of[scc], &scc_of))
            .collect::<Vec<_>>();
        let weak = (0..n_sccs)
            .map(|scc| Self::compute_weak(src, &states_of[scc], &scc_of))
            .collect::<Vec<_>>();

        let mut oracle = Self {
            scc_of,
            states_of,
            succ_sccs,
            accepting,
            weak,
            avoid: vec![false; n_sccs],
            bottom_up_order: order,
        };
        oracle.avoid = oracle.compute_avoid(src);
        log::debug!("decomposed {} states into {n_sccs} sccs", src.num_states());
        oracle
    }

    /// An SCC is accepting iff every acceptance mark `0..k` labels at least
    /// one internal edge (both endpoints inside the SCC). Vacuously true
    /// when `k == 0` (the automaton declares no acceptance sets at all).
    fn compute_accepting(src: &Automaton, members: &BTreeSet<StateId>, scc_of: &[SccId]) -> bool {
        (0..src.num_marks()).all(|mark| {
            members.iter().any(|&s| {
                src.edges(s)
                    .iter()
                    .any(|e| scc_of[e.dst] == scc_of[s] && e.acc.contains(&mark))
            })
        })
    }

    /// An SCC is inherently weak when every internal edge carries the same
    /// acceptance mark set (all internal cycles are uniformly accepting or
    /// uniformly rejecting).
    fn compute_weak(src: &Automaton, members: &BTreeSet<StateId>, scc_of: &[SccId]) -> bool {
        let mut seen = None;
        for &s in members {
            for edge in src.edges(s) {
                if scc_of[edge.dst] != scc_of[s] {
                    continue;
                }
                match &seen {
                    None => seen = Some(edge.acc.clone()),
                    Some(acc) if *acc != edge.acc => return false,
                    Some(_) => {}
                }
            }
        }
        true
    }

    /// Bottom-up (successors-before-predecessors) computation of `avoid`.
    fn compute_avoid(&self, src: &Automaton) -> Vec<bool> {
        let mut avoid = vec![false; self.states_of.len()];
        for &scc in &self.bottom_up_order {
            let deterministic = self.is_deterministic_scc(src, scc, false);
            let successors_avoidable = self.succ_sccs[scc].iter().all(|&s| avoid[s]);
            avoid[scc] = deterministic && successors_avoidable;
        }
        avoid
    }

    /// The SCC containing state `s`.
    #[inline]
    #[must_use]
    pub fn scc_of(&self, s: StateId) -> SccId {
        self.scc_of[s]
    }

    /// The member states of an SCC.
    #[inline]
    #[must_use]
    pub fn states_of(&self, scc: SccId) -> &BTreeSet<StateId> {
        &self.states_of[scc]
    }

    /// Whether `scc` is an accepting SCC.
    #[inline]
    #[must_use]
    pub fn is_accepting(&self, scc: SccId) -> bool {
        self.accepting[scc]
    }

    /// Whether `scc` is inherently weak.
    #[inline]
    #[must_use]
    pub fn is_weak(&self, scc: SccId) -> bool {
        self.weak[scc]
    }

    /// Successor SCCs of `scc` (cross-SCC edges only).
    #[inline]
    #[must_use]
    pub fn successor_sccs(&self, scc: SccId) -> &BTreeSet<SccId> {
        &self.succ_sccs[scc]
    }

    /// SCCs in reverse topological order (successors precede predecessors).
    #[inline]
    #[must_use]
    pub fn bottom_up_order(&self) -> &[SccId] {
        &self.bottom_up_order
    }

    /// Whether `scc`, for every one of its states, has pairwise-disjoint
    /// outgoing edge labels, optionally restricted to edges staying
    /// inside `scc`.
    #[must_use]
    pub fn is_deterministic_scc(&self, src: &Automaton, scc: SccId, inside_only: bool) -> bool {
        for &s in &self.states_of[scc] {
            let mut seen: Option<Bdd> = None;
            for edge in src.edges(s) {
                if inside_only && self.scc_of[edge.dst] != scc {
                    continue;
                }
                if let Some(ref acc) = seen {
                    if !edge.cond.and(acc).is_false() {
                        return false;
                    }
                    seen = Some(edge.cond.or(acc));
                } else {
                    seen = Some(edge.cond.clone());
                }
            }
        }
        true
    }

    /// `avoid(scc_of(s))`.
    #[inline]
    #[must_use]
    pub fn avoid_state(&self, s: StateId) -> bool {
        self.avoid[self.scc_of[s]]
    }

    /// `avoid(scc)`: deterministic and every successor SCC is avoidable.
    #[inline]
    #[must_use]
    pub fn avoid(&self, scc: SccId) -> bool {
        self.avoid[scc]
    }

    /// Number of SCCs.
    #[inline]
    #[must_use]
    pub fn num_sccs(&self) -> usize {
        self.states_of.len()
    }
}
