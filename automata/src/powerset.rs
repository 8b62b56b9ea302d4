/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Powerset successor builder: per-`(mark, state)` bitvector caches,
//! and the `successors` operation every powerset/breakpoint construction in
//! this crate is built from.

use crate::automaton::{Automaton, StateId};
use crate::minterm::MintermIndexer;
use bit_set::BitSet;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// Per-`(mark, state)` cache of minterm-indexed successor bitvectors.
///
/// "mark" here is either a real acceptance mark `0..k` or `k` itself, used
/// as the sentinel for "no mark restriction": the restriction applies only
/// when `m < k`.
pub struct PowersetBuilder<'a> {
    src: &'a Automaton,
    minterms: &'a MintermIndexer,
    cache: RefCell<HashMap<(usize, StateId), Vec<BitSet>>>,
}

impl<'a> PowersetBuilder<'a> {
    #[inline]
    #[must_use]
    pub fn new(src: &'a Automaton, minterms: &'a MintermIndexer) -> Self {
        Self {
            src,
            minterms,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Sentinel mark value meaning "no restriction" in [`Self::successors`].
    #[inline]
    #[must_use]
    pub const fn no_mark(&self) -> usize {
        self.src.num_marks()
    }

    /// Per-minterm successor bitvectors of a single state under mark `m`,
    /// computed on first use and cached thereafter.
    fn row(&self, s: StateId, m: usize) -> Vec<BitSet> {
        if let Some(row) = self.cache.borrow().get(&(m, s)) {
            return row.clone();
        }
        let nc = self.minterms.num_of_conds();
        let mut row = vec![BitSet::with_capacity(self.src.num_states()); nc];
        let k = self.src.num_marks();
        for edge in self.src.edges(s) {
            if m < k && !edge.acc.contains(&m) {
                continue;
            }
            for c in self.minterms.minterms_of(&edge.cond) {
                row[c].insert(edge.dst);
            }
        }
        self.cache.borrow_mut().insert((m, s), row.clone());
        row
    }

    /// Successors of `S` under every minterm, restricted to edges carrying
    /// mark `m` (or unrestricted when `m >= k`), and optionally filtered to
    /// `filter` (or its complement, when `complement_filter` is set).
    ///
    /// Returns one subset of source states per minterm index `0..nc`.
    #[must_use]
    pub fn successors(
        &self,
        s: &BTreeSet<StateId>,
        m: usize,
        filter: Option<&BitSet>,
        complement_filter: bool,
    ) -> Vec<BTreeSet<StateId>> {
        let nc = self.minterms.num_of_conds();
        if s.is_empty() {
            return vec![BTreeSet::new(); nc];
        }
        let mut acc = vec![BitSet::with_capacity(self.src.num_states()); nc];
        for &state in s {
            let row = self.row(state, m);
            for (bucket, bits) in acc.iter_mut().zip(row) {
                bucket.union_with(&bits);
            }
        }
        if let Some(f) = filter {
            for bucket in &mut acc {
                if complement_filter {
                    let mut complement = BitSet::with_capacity(self.src.num_states());
                    for state in bucket.iter() {
                        if !f.contains(state) {
                            complement.insert(state);
                        }
                    }
                    *bucket = complement;
                } else {
                    bucket.intersect_with(f);
                }
            }
        }
        acc.into_iter().map(|b| b.iter().collect()).collect()
    }

    /// Like [`Self::successors`] but for a single minterm `c`, convenient
    /// when the caller already knows which minterm it wants (e.g. following
    /// one cut edge's label).
    #[must_use]
    pub fn successors_at(
        &self,
        s: &BTreeSet<StateId>,
        m: usize,
        c: usize,
        filter: Option<&BitSet>,
        complement_filter: bool,
    ) -> BTreeSet<StateId> {
        self.successors(s, m, filter, complement_filter)
            .into_iter()
            .nth(c)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Edge;

    fn tiny() -> (Automaton, MintermIndexer) {
        // 0 --a--> 1 --a{0}--> 1, 0 --b--> 2 --b{1}--> 2
        let idx = MintermIndexer::new(&["a".to_owned(), "b".to_owned()]).unwrap();
        let a = idx.bdd_vars().mk_var(idx.bdd_vars().var_by_name("a").unwrap());
        let b = idx.bdd_vars().mk_var(idx.bdd_vars().var_by_name("b").unwrap());
        let edges = vec![
            vec![
                Edge::unmarked(0, idx.bdd_vars().mk_true()),
                Edge::unmarked(1, a.clone()),
                Edge::unmarked(2, b.clone()),
            ],
            vec![Edge {
                dst: 1,
                cond: a,
                acc: [0].into_iter().collect(),
            }],
            vec![Edge {
                dst: 2,
                cond: b,
                acc: [1].into_iter().collect(),
            }],
        ];
        (Automaton::new(edges, 0, 2, vec!["a".into(), "b".into()]), idx)
    }

    #[test]
    fn empty_set_has_empty_successors() {
        let (src, idx) = tiny();
        let pb = PowersetBuilder::new(&src, &idx);
        let out = pb.successors(&BTreeSet::new(), pb.no_mark(), None, false);
        assert!(out.iter().all(BTreeSet::is_empty));
        assert_eq!(out.len(), idx.num_of_conds());
    }

    #[test]
    fn unmarked_successors_union_over_set() {
        let (src, idx) = tiny();
        let pb = PowersetBuilder::new(&src, &idx);
        let s: BTreeSet<_> = [0usize].into_iter().collect();
        let out = pb.successors(&s, pb.no_mark(), None, false);
        let total: BTreeSet<_> = out.into_iter().flatten().collect();
        assert_eq!(total, [0, 1, 2].into_iter().collect());
    }

    #[test]
    fn mark_restriction_filters_edges() {
        let (src, idx) = tiny();
        let pb = PowersetBuilder::new(&src, &idx);
        let s: BTreeSet<_> = [1usize].into_iter().collect();
        // Mark 0 keeps the self-loop; mark 1 drops it.
        let kept = pb.successors(&s, 0, None, false);
        assert!(kept.iter().any(|x| x.contains(&1)));
        let dropped = pb.successors(&s, 1, None, false);
        assert!(dropped.iter().all(BTreeSet::is_empty));
    }
}
