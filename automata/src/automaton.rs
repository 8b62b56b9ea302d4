/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Data model: the source automaton, result-automaton state kinds, and
//! the bidirectional maps tying semantic states to integer ids.

use biodivine_lib_bdd::Bdd;
use std::collections::{BTreeMap, BTreeSet};

/// Index of a state, in either the source or the result automaton.
pub type StateId = usize;

/// An acceptance mark set: which of the `0..k` generalized-Buchi sets an
/// edge belongs to.
pub type Acceptance = BTreeSet<usize>;

/// One edge of an automaton: `(dst, cond, acc)`, the source end being
/// implicit in whichever adjacency list holds it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edge {
    /// Destination state.
    pub dst: StateId,
    /// Boolean condition over the atomic propositions.
    pub cond: Bdd,
    /// Acceptance marks this edge carries.
    pub acc: Acceptance,
}

impl Edge {
    /// Build an edge with no acceptance marks.
    #[inline]
    #[must_use]
    pub const fn unmarked(dst: StateId, cond: Bdd) -> Self {
        Self {
            dst,
            cond,
            acc: Acceptance::new(),
        }
    }
}

/// A source automaton: read-only input to every construction in this crate.
///
/// `k` (see [`Automaton::num_marks`]) is the number of generalized-Buchi
/// acceptance sets; an infinite run is accepting iff, for every mark `i`,
/// infinitely many of its edges carry `i`.
#[derive(Clone, Debug)]
pub struct Automaton {
    /// Adjacency list: `states[s]` is every outgoing edge of state `s`.
    states: Vec<Vec<Edge>>,
    /// Initial state.
    initial: StateId,
    /// Number of acceptance sets, `k`.
    num_marks: usize,
    /// Atomic proposition names, in the order the minterm indexer expects.
    ap_names: Vec<String>,
}

impl Automaton {
    /// Build a source automaton. Does not validate well-formedness; callers
    /// that parsed this from HOA text should have already checked the
    /// acceptance condition is generalized Buchi.
    #[inline]
    #[must_use]
    pub const fn new(
        states: Vec<Vec<Edge>>,
        initial: StateId,
        num_marks: usize,
        ap_names: Vec<String>,
    ) -> Self {
        Self {
            states,
            initial,
            num_marks,
            ap_names,
        }
    }

    /// Number of states.
    #[inline]
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The initial state.
    #[inline]
    #[must_use]
    pub const fn initial(&self) -> StateId {
        self.initial
    }

    /// Number of acceptance sets, `k`.
    #[inline]
    #[must_use]
    pub const fn num_marks(&self) -> usize {
        self.num_marks
    }

    /// Atomic proposition names.
    #[inline]
    #[must_use]
    pub fn ap_names(&self) -> &[String] {
        &self.ap_names
    }

    /// Outgoing edges of `s`.
    #[inline]
    #[must_use]
    pub fn edges(&self, s: StateId) -> &[Edge] {
        &self.states[s]
    }

    /// All state ids, `0..num_states()`.
    #[inline]
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        0..self.num_states()
    }
}

/// A breakpoint state `(R, B, ℓ)`: `R` is the candidate set of future
/// runs, `B ⊆ R` is the subset that still owes acceptance at level `ℓ`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Breakpoint {
    /// Candidate set of runs.
    pub r: BTreeSet<StateId>,
    /// Subset of `r` that has not yet witnessed acceptance at `level`.
    pub b: BTreeSet<StateId>,
    /// Rotating mark index, `0 <= level < k`.
    pub level: usize,
}

impl Breakpoint {
    /// Check the invariant every breakpoint state must satisfy:
    /// `R ≠ ∅ ∧ B ⊆ R ∧ 0 ≤ ℓ < k`.
    #[inline]
    #[must_use]
    pub fn is_well_formed(&self, k: usize) -> bool {
        !self.r.is_empty() && self.b.is_subset(&self.r) && self.level < k
    }
}

/// The semantic identity of a result-automaton state, as a tagged union
/// rather than an overloaded key type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum StateKind {
    /// An integer copy of a source state, used in the first component.
    Simple(StateId),
    /// A subset of source states, used as a first-component state when the
    /// first component is powerset-determinized.
    FirstPowerset(BTreeSet<StateId>),
    /// A subset of source states, used as a second-component state only for
    /// inherently weak SCCs under `powerset_for_weak`.
    SecondPowerset(BTreeSet<StateId>),
    /// A deterministic second-component state tracking `(R, B, ℓ)`.
    Breakpoint(Breakpoint),
    /// A verbatim copy of a source state whose SCC was reused unchanged.
    Reused(StateId),
}

impl StateKind {
    /// Human-readable name for debugging output (`--highlight`, logs).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Simple(s) => format!("s{s}"),
            Self::FirstPowerset(ps) => format!("PS1{ps:?}"),
            Self::SecondPowerset(ps) => format!("PS2{ps:?}"),
            Self::Breakpoint(bp) => format!("BP({:?},{:?},{})", bp.r, bp.b, bp.level),
            Self::Reused(s) => format!("reused(s{s})"),
        }
    }

    /// Whether this state belongs to the deterministic second component.
    #[must_use]
    pub const fn is_second_component(&self) -> bool {
        matches!(
            self,
            Self::SecondPowerset(_) | Self::Breakpoint(_) | Self::Reused(_)
        )
    }
}

/// Bidirectional maps from semantic states to integer ids.
///
/// Each id is owned by exactly one of the four interning maps; `Simple`
/// states are not interned here at all: the first-component build
/// (`cut_det = false` case) assigns them ids equal to the source state id
/// directly.
#[derive(Debug, Default)]
pub struct StateMaps {
    /// `id -> kind`, the authoritative record of what every id means.
    kinds: Vec<StateKind>,
    ps2num1: BTreeMap<BTreeSet<StateId>, StateId>,
    ps2num2: BTreeMap<BTreeSet<StateId>, StateId>,
    bp2num: BTreeMap<Breakpoint, StateId>,
    old2new2: BTreeMap<StateId, StateId>,
}

impl StateMaps {
    /// Allocate a fresh id for `kind`, without interning. Used for `Simple`
    /// and `Reused` states, each of which is keyed by its own map elsewhere
    /// (`old2new2` for `Reused`; `Simple` ids equal source ids).
    fn alloc(&mut self, kind: StateKind) -> StateId {
        let id = self.kinds.len();
        self.kinds.push(kind);
        id
    }

    /// Total number of ids allocated so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The kind behind an id.
    #[inline]
    #[must_use]
    pub fn kind(&self, id: StateId) -> &StateKind {
        &self.kinds[id]
    }

    /// Reserve ids `0..n` as `Simple` copies of source states `0..n`, in
    /// order, so `Simple` ids coincide with source ids.
    pub fn reserve_simple(&mut self, n: usize) {
        crate::invariant!(self.kinds.is_empty(), "reserve_simple called after allocation began");
        self.kinds.extend((0..n).map(StateKind::Simple));
    }

    /// Intern a first-component powerset state, returning its id (existing or freshly allocated).
    pub fn first_powerset(&mut self, ps: BTreeSet<StateId>) -> (StateId, bool) {
        if let Some(&id) = self.ps2num1.get(&ps) {
            return (id, false);
        }
        let id = self.alloc(StateKind::FirstPowerset(ps.clone()));
        self.ps2num1.insert(ps, id);
        (id, true)
    }

    /// Intern a second-component powerset state.
    pub fn second_powerset(&mut self, ps: BTreeSet<StateId>) -> (StateId, bool) {
        if let Some(&id) = self.ps2num2.get(&ps) {
            return (id, false);
        }
        let id = self.alloc(StateKind::SecondPowerset(ps.clone()));
        self.ps2num2.insert(ps, id);
        (id, true)
    }

    /// Intern a breakpoint state.
    pub fn breakpoint(&mut self, bp: Breakpoint) -> (StateId, bool) {
        if let Some(&id) = self.bp2num.get(&bp) {
            return (id, false);
        }
        let id = self.alloc(StateKind::Breakpoint(bp.clone()));
        self.bp2num.insert(bp, id);
        (id, true)
    }

    /// Intern a reused copy of source state `s`.
    pub fn reused(&mut self, s: StateId) -> (StateId, bool) {
        if let Some(&id) = self.old2new2.get(&s) {
            return (id, false);
        }
        let id = self.alloc(StateKind::Reused(s));
        self.old2new2.insert(s, id);
        (id, true)
    }

    /// Every id allocated, for iterating in assignment order.
    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        0..self.len()
    }

    /// Consume the maps, keeping only the `id -> kind` record (the engine
    /// needs nothing else once construction is done).
    #[must_use]
    pub fn into_kinds(self) -> Vec<StateKind> {
        self.kinds
    }
}

/// The result automaton: what the engine produces.
#[derive(Debug)]
pub struct ResultAutomaton {
    /// Outgoing edges, indexed by result state id.
    pub states: Vec<Vec<Edge>>,
    /// Semantic kind of each result state id, for debugging/highlighting.
    pub kinds: Vec<StateKind>,
    /// Initial state.
    pub initial: StateId,
    /// Number of acceptance sets in the result (1 for plain Buchi, `k` when
    /// `reuse_SCC` preserves original TGBA marks on reused states).
    pub num_marks: usize,
    /// Atomic proposition names, copied from the source.
    pub ap_names: Vec<String>,
}

impl ResultAutomaton {
    #[inline]
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Drop every state unreachable from `initial` and reindex the rest
    /// densely, preserving relative order.
    pub fn purge_unreachable(&mut self) {
        let n = self.num_states();
        let mut reachable = vec![false; n];
        let mut queue = std::collections::VecDeque::new();
        reachable[self.initial] = true;
        queue.push_back(self.initial);
        while let Some(s) = queue.pop_front() {
            for e in &self.states[s] {
                if !reachable[e.dst] {
                    reachable[e.dst] = true;
                    queue.push_back(e.dst);
                }
            }
        }

        let mut remap = vec![usize::MAX; n];
        let mut next_id = 0;
        for (s, remapped) in remap.iter_mut().enumerate() {
            if reachable[s] {
                *remapped = next_id;
                next_id += 1;
            }
        }

        let mut new_states = Vec::with_capacity(next_id);
        let mut new_kinds = Vec::with_capacity(next_id);
        for (s, mut edges) in std::mem::take(&mut self.states).into_iter().enumerate() {
            if !reachable[s] {
                continue;
            }
            for e in &mut edges {
                e.dst = remap[e.dst];
            }
            new_states.push(edges);
            new_kinds.push(self.kinds[s].clone());
        }
        self.initial = remap[self.initial];
        self.states = new_states;
        self.kinds = new_kinds;
    }
}

#[cfg(feature = "quickcheck")]
impl quickcheck::Arbitrary for Breakpoint {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        use quickcheck::Arbitrary as _;
        let universe: Vec<StateId> = (0..*g.choose(&[1, 2, 3, 4]).unwrap_or(&3)).collect();
        let r: BTreeSet<StateId> = universe
            .iter()
            .copied()
            .filter(|_| bool::arbitrary(g))
            .chain(std::iter::once(universe[0]))
            .collect();
        let b: BTreeSet<StateId> = r.iter().copied().filter(|_| bool::arbitrary(g)).collect();
        let level = *g.choose(&[0, 1, 2]).unwrap_or(&0);
        Self { r, b, level }
    }
}
