/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Two-component engine: first-component build, cut-edge enumeration,
//! breakpoint-with-levels second component, and the optimization toggles
//! that mutate how they're assembled.

use crate::automaton::{
    Acceptance, Automaton, Breakpoint, Edge, ResultAutomaton, StateId, StateKind, StateMaps,
};
use crate::determinize::merge_parallel_edges;
use crate::minterm::MintermIndexer;
use crate::powerset::PowersetBuilder;
use crate::scc::{SccId, SccOracle};
use bit_set::BitSet;
use biodivine_lib_bdd::Bdd;
use std::collections::BTreeSet;

/// Every optimization toggle, plus `cut_det` (the headline choice
/// between semi-deterministic and cut-deterministic output).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Produce a cut-deterministic result (powerset-determinized first
    /// component) rather than merely semi-deterministic.
    pub cut_det: bool,
    /// Restrict powerset/breakpoint successors to the target scc.
    pub scc_aware: bool,
    /// Use a powerset (rather than a breakpoint) second-component state for
    /// inherently weak sccs.
    pub powerset_for_weak: bool,
    /// Compute cut-edge successors via one powerset/breakpoint step instead
    /// of landing on a fresh `(0, {v}, ∅)`/`{v}` state.
    pub powerset_on_cut: bool,
    /// Run the "remove useless prefixes" pass after construction.
    pub jump_to_bottommost: bool,
    /// Reuse already-deterministic, avoidable sccs verbatim instead of
    /// feeding them through the breakpoint construction.
    pub reuse_scc: bool,
    /// Let `avoid(scc)` gate cut-edge targets and first-component filtering.
    pub bscc_avoid: bool,
    /// Advance the level past more than one mark in a single step when the
    /// breakpoint equality persists.
    pub skip_levels: bool,
    /// Cut on every edge into an accepting scc, not only highest-mark edges.
    pub cut_always: bool,
    /// Cut whenever an edge crosses into a different (accepting) scc.
    pub cut_on_scc_entry: bool,
}

impl Default for Options {
    /// Matches the upstream defaults: every optimization on except
    /// `cut_det` (semi-deterministic is the default target) and
    /// `cut_on_scc_entry`.
    fn default() -> Self {
        Self {
            cut_det: false,
            scc_aware: true,
            powerset_for_weak: true,
            powerset_on_cut: true,
            jump_to_bottommost: true,
            reuse_scc: true,
            bscc_avoid: true,
            skip_levels: true,
            cut_always: true,
            cut_on_scc_entry: false,
        }
    }
}

impl Options {
    /// `--pure`: disable every optimization except scc-awareness, and
    /// disable `cut_always`/`cut_on_scc_entry` explicitly (pre/post
    /// simplification toggles live outside the engine, in the driver).
    #[must_use]
    pub const fn pure(cut_det: bool) -> Self {
        Self {
            cut_det,
            scc_aware: true,
            powerset_for_weak: false,
            powerset_on_cut: false,
            jump_to_bottommost: false,
            reuse_scc: false,
            bscc_avoid: false,
            skip_levels: false,
            cut_always: false,
            cut_on_scc_entry: false,
        }
    }
}

/// Build a semi-deterministic or cut-deterministic result from `src`.
#[must_use]
pub fn build(src: &Automaton, minterms: &MintermIndexer, options: &Options) -> ResultAutomaton {
    log::debug!(
        "building {} result from {} source states, {} marks, cut_det={}",
        if options.cut_det { "cut-deterministic" } else { "semi-deterministic" },
        src.num_states(),
        src.num_marks(),
        options.cut_det
    );
    let oracle = SccOracle::new(src);
    let pb = PowersetBuilder::new(src, minterms);

    // The acceptance mark stamped on every "this transition is accepting"
    // edge in the second component (the PS/BP cases). Under `reuse_SCC`
    // the result keeps the source's full mark set, so an
    // infinite run that never reaches a reused scc still needs every mark
    // `0..k` to appear infinitely; stamping only mark 0 there would starve
    // marks `1..k` and break language preservation. We therefore stamp the
    // whole declared mark set, not literally `{0}`.
    let result_marks: Acceptance = if options.reuse_scc {
        (0..src.num_marks()).collect()
    } else {
        Acceptance::from([0])
    };
    let num_marks = if options.reuse_scc { src.num_marks() } else { 1 };

    let mut engine = Engine {
        src,
        minterms,
        oracle: &oracle,
        pb: &pb,
        options,
        result_marks,
        maps: StateMaps::default(),
        states: Vec::new(),
    };

    let natural_initial = engine.build_first_component();
    let first_component_len = engine.maps.len();

    // `bscc_avoid` drops every edge whose source or destination scc is
    // `avoid`-flagged, trusting a cut edge to reintroduce that scc from a
    // non-avoided predecessor. When the source automaton's *initial* state
    // is itself in an avoided scc there is no such predecessor (an avoided
    // scc's successors are always themselves avoided, so an avoided initial
    // scc means the whole reachable automaton is one), and no cut edge
    // would ever be generated to reach it. `materialize_entry` stands in
    // for that missing cut edge; it must run after `first_component_len` is
    // captured so the state it creates is treated as second component.
    let initial = if options.bscc_avoid && oracle.avoid_state(src.initial()) {
        engine.materialize_entry(src.initial())
    } else {
        natural_initial
    };

    engine.enumerate_cut_edges(first_component_len);
    engine.finish_second_component(first_component_len);

    let mut states = engine.states;
    merge_parallel_edges(&mut states);

    let mut result = ResultAutomaton {
        states,
        kinds: engine.maps.into_kinds(),
        initial,
        num_marks,
        ap_names: src.ap_names().to_vec(),
    };

    if options.jump_to_bottommost {
        remove_useless_prefixes(&mut result);
    }
    // `materialize_entry` can leave the original first-component copy of an
    // avoided initial scc dangling with no path back to the (retargeted)
    // initial state; drop it regardless of `jump_to_bottommost`.
    result.purge_unreachable();

    #[cfg(debug_assertions)]
    verify_invariants(src, &result, options);

    log::debug!("result has {} states", result.num_states());
    result
}

struct Engine<'a> {
    src: &'a Automaton,
    minterms: &'a MintermIndexer,
    oracle: &'a SccOracle,
    pb: &'a PowersetBuilder<'a>,
    options: &'a Options,
    result_marks: Acceptance,
    maps: StateMaps,
    states: Vec<Vec<Edge>>,
}

impl<'a> Engine<'a> {
    /// Allocate adjacency storage for `id` if it was freshly interned.
    fn touch(&mut self, id: StateId, is_new: bool) {
        if is_new {
            crate::invariant!(id == self.states.len(), "state ids must be assigned in order");
            self.states.push(Vec::new());
        }
    }

    fn bitset_of(&self, members: &BTreeSet<StateId>) -> BitSet {
        let mut bs = BitSet::with_capacity(self.src.num_states());
        for &s in members {
            bs.insert(s);
        }
        bs
    }

    /// `scc_states` filter for the scc containing `representative`:
    /// `None` when `scc_aware` is off, or when `bscc_avoid` marks
    /// the scc (an avoid-flagged scc's filter is unrestricted, not empty).
    fn scc_filter(&self, representative: StateId) -> Option<BitSet> {
        if !self.options.scc_aware {
            return None;
        }
        let scc = self.oracle.scc_of(representative);
        if self.options.bscc_avoid && self.oracle.avoid(scc) {
            return None;
        }
        Some(self.bitset_of(self.oracle.states_of(scc)))
    }

    /// First-component build. Returns the first component's own
    /// initial candidate; `build` overrides this with `materialize_entry`
    /// when the source's initial scc is itself `avoid`-flagged, since the
    /// override must happen after `first_component_len` is captured (the
    /// materialized state belongs to the second component, not the first).
    fn build_first_component(&mut self) -> StateId {
        if !self.options.cut_det {
            self.maps.reserve_simple(self.src.num_states());
            self.states = vec![Vec::new(); self.src.num_states()];
            for s in self.src.state_ids() {
                for edge in self.src.edges(s) {
                    if self.options.bscc_avoid
                        && (self.oracle.avoid_state(s) || self.oracle.avoid_state(edge.dst))
                    {
                        continue;
                    }
                    self.states[s].push(Edge::unmarked(edge.dst, edge.cond.clone()));
                }
            }
            self.src.initial()
        } else {
            let not_avoided = if self.options.bscc_avoid {
                let keep: BTreeSet<StateId> = self
                    .src
                    .state_ids()
                    .filter(|&s| !self.oracle.avoid_state(s))
                    .collect();
                Some(self.bitset_of(&keep))
            } else {
                None
            };

            let init_ps: BTreeSet<StateId> = [self.src.initial()].into_iter().collect();
            let (initial, is_new) = self.maps.first_powerset(init_ps);
            self.touch(initial, is_new);

            let mut next = 0;
            while next < self.maps.len() {
                let id = next;
                next += 1;
                let ps = match self.maps.kind(id) {
                    StateKind::FirstPowerset(ps) => ps.clone(),
                    _ => crate::never!(),
                };
                let succs = self
                    .pb
                    .successors(&ps, self.pb.no_mark(), not_avoided.as_ref(), false);
                for (c, d_ps) in succs.into_iter().enumerate() {
                    if d_ps.is_empty() {
                        continue;
                    }
                    let (dst, is_new) = self.maps.first_powerset(d_ps);
                    self.touch(dst, is_new);
                    self.states[id].push(Edge::unmarked(dst, self.minterms.cond_of(c)));
                }
            }
            initial
        }
    }

    /// Whether edge `u -> v` (carrying acceptance `acc`) is a cut edge.
    fn cut_condition(&self, u: StateId, v: StateId, acc: &Acceptance) -> bool {
        let u_scc = self.oracle.scc_of(u);
        let v_scc = self.oracle.scc_of(v);
        if self.options.bscc_avoid && self.oracle.avoid(u_scc) {
            return false;
        }
        if self.options.bscc_avoid && self.oracle.avoid(v_scc) {
            return true;
        }
        if !self.oracle.is_accepting(v_scc) {
            return false;
        }
        let top_mark = self.src.num_marks().saturating_sub(1);
        self.options.cut_always
            || acc.contains(&top_mark)
            || (self.options.cut_on_scc_entry && u_scc != v_scc)
    }

    /// Enumerate cut edges over every source edge.
    fn enumerate_cut_edges(&mut self, first_component_len: StateId) {
        for u in self.src.state_ids() {
            let edges = self.src.edges(u).to_vec();
            for edge in edges {
                if !self.cut_condition(u, edge.dst, &edge.acc) {
                    continue;
                }
                let v = edge.dst;
                let v_scc = self.oracle.scc_of(v);

                let froms: Vec<StateId> = if self.options.cut_det {
                    (0..first_component_len)
                        .filter(|&id| match self.maps.kind(id) {
                            StateKind::FirstPowerset(ps) => ps.contains(&u),
                            _ => crate::never!(),
                        })
                        .collect()
                } else {
                    vec![u]
                };

                for from in froms {
                    self.add_cut_transition(from, u, v, v_scc, &edge.cond);
                }
            }
        }
    }

    /// Emit one cut transition out of `from`. The `reuse_SCC and
    /// avoid(v_scc)` test is the literal cut-edge condition, not gated by
    /// `bscc_avoid` here (unlike `cut_condition` and the first-component
    /// filter, which are): `avoid(v_scc)` is a structural scc property, and
    /// once the engine decided to cut at all, whether to reuse the target
    /// scc verbatim depends only on whether `reuse_SCC` asked for it.
    fn add_cut_transition(&mut self, from: StateId, u: StateId, v: StateId, v_scc: SccId, cond: &Bdd) {
        let weak = self.oracle.is_weak(v_scc);
        let reuse_target = self.options.reuse_scc && self.oracle.avoid(v_scc);

        if reuse_target {
            let (dst, is_new) = self.maps.reused(v);
            self.touch(dst, is_new);
            self.states[from].push(Edge::unmarked(dst, cond.clone()));
            return;
        }

        let use_powerset_for_weak = self.options.powerset_for_weak && weak;

        if !self.options.powerset_on_cut {
            let target = self.cut_target_small(v, use_powerset_for_weak);
            self.states[from].push(Edge::unmarked(target, cond.clone()));
        } else {
            let scc_states = if self.options.scc_aware {
                Some(self.bitset_of(self.oracle.states_of(v_scc)))
            } else {
                None
            };
            let start: BTreeSet<StateId> = [u].into_iter().collect();
            if use_powerset_for_weak {
                self.emit_ps_edges(&start, from, scc_states.as_ref(), true, Some(cond));
            } else {
                let bp = Breakpoint {
                    r: start,
                    b: BTreeSet::new(),
                    level: 0,
                };
                self.emit_bp_edges(&bp, from, scc_states.as_ref(), Some(cond), true);
            }
        }
    }

    /// Land on a fresh singleton second-component state for `v` (the
    /// "not `powerset_on_cut`" landing): a `{v}` PS state for a weak scc
    /// under `powerset_for_weak`, else a fresh `(0, {v}, ∅)` breakpoint.
    /// Shared between an actual cut edge and `materialize_entry`, which has
    /// no predecessor edge to land one step further with `powerset_on_cut`.
    fn cut_target_small(&mut self, v: StateId, use_powerset_for_weak: bool) -> StateId {
        if use_powerset_for_weak {
            let ps: BTreeSet<StateId> = [v].into_iter().collect();
            let (id, is_new) = self.maps.second_powerset(ps);
            self.touch(id, is_new);
            id
        } else {
            let bp = Breakpoint {
                r: [v].into_iter().collect(),
                b: BTreeSet::new(),
                level: 0,
            };
            let (id, is_new) = self.maps.breakpoint(bp);
            self.touch(id, is_new);
            id
        }
    }

    /// Materialize a second-component entry point for `v` as though a cut
    /// edge from outside the first component had just landed on it: the
    /// same `reuse_SCC`/weak/breakpoint dispatch as `add_cut_transition`,
    /// but with no `from` state and no label to attach an edge to.
    ///
    /// Needed when `v`'s scc has no non-avoided predecessor to cut from —
    /// most commonly because `v` is the source automaton's initial state and
    /// its whole forward-reachable closure is `avoid`-flagged. Dropping that
    /// scc's edges from the first component (as `bscc_avoid` does) without
    /// ever cutting into it from somewhere would otherwise lose every edge
    /// in that region.
    fn materialize_entry(&mut self, v: StateId) -> StateId {
        let v_scc = self.oracle.scc_of(v);
        if self.options.reuse_scc && self.oracle.avoid(v_scc) {
            let (dst, is_new) = self.maps.reused(v);
            self.touch(dst, is_new);
            return dst;
        }
        let use_powerset_for_weak = self.options.powerset_for_weak && self.oracle.is_weak(v_scc);
        self.cut_target_small(v, use_powerset_for_weak)
    }

    /// Emit second-component PS successor edges (the "Powerset" case),
    /// also reused for the `powerset_on_cut` weak-scc cut-edge case.
    fn emit_ps_edges(
        &mut self,
        ps: &BTreeSet<StateId>,
        from: StateId,
        filter: Option<&BitSet>,
        mark_accepting: bool,
        cond_constrain: Option<&Bdd>,
    ) {
        crate::invariant!(!ps.is_empty(), "PS successor of an empty set");
        let succs = self.pb.successors(ps, self.pb.no_mark(), filter, false);
        for (c, d_ps) in succs.into_iter().enumerate() {
            if d_ps.is_empty() {
                continue;
            }
            let cond = self.minterms.cond_of(c);
            if let Some(cc) = cond_constrain {
                if cond.and(cc).is_false() {
                    continue;
                }
            }
            let (dst, is_new) = self.maps.second_powerset(d_ps);
            self.touch(dst, is_new);
            let acc = if mark_accepting {
                self.result_marks.clone()
            } else {
                Acceptance::new()
            };
            self.states[from].push(Edge { dst, cond, acc });
        }
    }

    /// Emit second-component breakpoint successor edges (the
    /// "Breakpoint" case). `suppress_advance` disables the level-advance
    /// loop and acceptance marking for the one-step cut-edge computation
    /// (`powerset_on_cut`'s non-weak branch lands on a single BP step from
    /// `{u}`, not a continuing breakpoint transition).
    fn emit_bp_edges(
        &mut self,
        bp: &Breakpoint,
        from: StateId,
        filter: Option<&BitSet>,
        cond_constrain: Option<&Bdd>,
        suppress_advance: bool,
    ) {
        crate::invariant!(!bp.r.is_empty(), "breakpoint R must be nonempty");
        let k = self.src.num_marks();
        crate::invariant!(k > 0, "breakpoint construction requires at least one mark");
        let no_mark = self.pb.no_mark();

        let r_succ = self.pb.successors(&bp.r, no_mark, filter, false);
        let b_succ = self.pb.successors(&bp.b, no_mark, filter, false);
        let r_level_succ = self.pb.successors(&bp.r, bp.level, filter, false);

        for c in 0..self.minterms.num_of_conds() {
            let cond = self.minterms.cond_of(c);
            if let Some(cc) = cond_constrain {
                if cond.and(cc).is_false() {
                    continue;
                }
            }
            let p2 = &r_succ[c];
            if p2.is_empty() {
                continue;
            }
            let mut q2: BTreeSet<StateId> =
                b_succ[c].iter().chain(r_level_succ[c].iter()).copied().collect();

            let mut level2 = bp.level;
            let mut mark = Acceptance::new();
            loop {
                if !suppress_advance && &q2 == p2 {
                    level2 = (level2 + 1) % k;
                    mark = self.result_marks.clone();
                    q2 = self.pb.successors_at(&bp.r, level2, c, filter, false);
                } else {
                    break;
                }
                if !(level2 != bp.level && self.options.skip_levels) {
                    break;
                }
            }
            if &q2 == p2 {
                q2.clear();
            }

            let dst_bp = Breakpoint {
                r: p2.clone(),
                b: q2,
                level: level2,
            };
            let (dst, is_new) = self.maps.breakpoint(dst_bp);
            self.touch(dst, is_new);
            self.states[from].push(Edge { dst, cond, acc: mark });
        }
    }

    fn emit_reused_edges(&mut self, old: StateId, from: StateId) {
        let edges = self.src.edges(old).to_vec();
        for edge in edges {
            let (dst, is_new) = self.maps.reused(edge.dst);
            self.touch(dst, is_new);
            self.states[from].push(Edge {
                dst,
                cond: edge.cond.clone(),
                acc: edge.acc.clone(),
            });
        }
    }

    /// Process every second-component state in id order.
    fn finish_second_component(&mut self, first_component_len: StateId) {
        let mut next = first_component_len;
        while next < self.maps.len() {
            let id = next;
            next += 1;
            match self.maps.kind(id).clone() {
                StateKind::Reused(s) => self.emit_reused_edges(s, id),
                StateKind::SecondPowerset(ps) => {
                    let rep = *ps.iter().next().unwrap_or_else(|| crate::never!());
                    let filter = self.scc_filter(rep);
                    self.emit_ps_edges(&ps, id, filter.as_ref(), true, None);
                }
                StateKind::Breakpoint(bp) => {
                    let rep = *bp.r.iter().next().unwrap_or_else(|| crate::never!());
                    let filter = self.scc_filter(rep);
                    self.emit_bp_edges(&bp, id, filter.as_ref(), None, false);
                }
                StateKind::Simple(_) | StateKind::FirstPowerset(_) => crate::never!(),
            }
        }
    }
}

/// "Remove useless prefixes" (`jump_to_bottommost`): retarget every
/// BP state onto the bottommost other BP state sharing its `R` component.
fn remove_useless_prefixes(result: &mut ResultAutomaton) {
    let n = result.num_states();
    if n == 0 {
        return;
    }

    let scc_of = result_scc_decomposition(result);
    let n_sccs = scc_of.iter().copied().max().map_or(0, |m| m + 1);
    let mut members_by_scc: Vec<Vec<StateId>> = vec![Vec::new(); n_sccs];
    for (s, &scc) in scc_of.iter().enumerate() {
        members_by_scc[scc].push(s);
    }

    // Reverse topological order over the result's own condensation, derived
    // the same way `SccOracle` derives its `bottom_up_order` (successors
    // before predecessors).
    let order = reverse_topological_scc_order(result, &scc_of, n_sccs);

    let mut bottommost: std::collections::BTreeMap<BTreeSet<StateId>, StateId> =
        std::collections::BTreeMap::new();
    for &scc in &order {
        for &s in &members_by_scc[scc] {
            if let StateKind::Breakpoint(bp) = &result.kinds[s] {
                bottommost.entry(bp.r.clone()).or_insert(s);
            }
        }
    }

    let mut retarget: Vec<StateId> = (0..n).collect();
    for s in 0..n {
        if let StateKind::Breakpoint(bp) = &result.kinds[s] {
            if let Some(&other) = bottommost.get(&bp.r) {
                if scc_of[s] != scc_of[other] {
                    retarget[s] = other;
                }
            }
        }
    }

    for edges in &mut result.states {
        for e in edges.iter_mut() {
            e.dst = retarget[e.dst];
        }
    }
    result.initial = retarget[result.initial];
    result.purge_unreachable();
}

/// Assign each state its (dense, 0-based) scc id via `petgraph`.
fn result_scc_decomposition(result: &ResultAutomaton) -> Vec<SccId> {
    use petgraph::algo::condensation;
    use petgraph::graph::DiGraph;

    let n = result.num_states();
    let mut graph = DiGraph::<StateId, ()>::new();
    for s in 0..n {
        let idx = graph.add_node(s);
        debug_assert_eq!(idx.index(), s);
    }
    for s in 0..n {
        for e in &result.states[s] {
            graph.add_edge(s.into(), e.dst.into(), ());
        }
    }
    let condensed = condensation(graph, true);
    let mut scc_of = vec![0usize; n];
    for idx in condensed.node_indices() {
        for &s in &condensed[idx] {
            scc_of[s] = idx.index();
        }
    }
    scc_of
}

/// Successors-before-predecessors order over the sccs induced by `scc_of`.
fn reverse_topological_scc_order(
    result: &ResultAutomaton,
    scc_of: &[SccId],
    n_sccs: usize,
) -> Vec<SccId> {
    use petgraph::algo::toposort;
    use petgraph::graph::DiGraph;

    let mut graph = DiGraph::<SccId, ()>::new();
    for scc in 0..n_sccs {
        let idx = graph.add_node(scc);
        debug_assert_eq!(idx.index(), scc);
    }
    let mut seen_edges = std::collections::BTreeSet::new();
    for s in 0..result.num_states() {
        for e in &result.states[s] {
            let (a, b) = (scc_of[s], scc_of[e.dst]);
            if a != b && seen_edges.insert((a, b)) {
                graph.add_edge(a.into(), b.into(), ());
            }
        }
    }
    let mut order = toposort(&graph, None)
        .expect("condensation is acyclic")
        .into_iter()
        .map(|idx| idx.index())
        .collect::<Vec<_>>();
    order.reverse();
    order
}

#[cfg(debug_assertions)]
fn verify_invariants(src: &Automaton, result: &ResultAutomaton, options: &Options) {
    let k = src.num_marks();
    for kind in &result.kinds {
        if let StateKind::Breakpoint(bp) = kind {
            crate::invariant!(bp.is_well_formed(k.max(1)), "malformed breakpoint state {bp:?}");
        }
    }

    for (s, kind) in result.kinds.iter().enumerate() {
        if !kind.is_second_component() {
            continue;
        }
        let mut seen: Option<Bdd> = None;
        for e in &result.states[s] {
            match &seen {
                Some(acc) => {
                    crate::invariant!(
                        e.cond.and(acc).is_false(),
                        "second-component state {s} is not deterministic"
                    );
                    seen = Some(e.cond.or(acc));
                }
                None => seen = Some(e.cond.clone()),
            }
        }
    }

    if options.cut_det {
        let check = Automaton::new(
            result.states.clone(),
            result.initial,
            result.num_marks,
            result.ap_names.clone(),
        );
        let oracle = SccOracle::new(&check);
        let (is_cd, _) = crate::cutdet::is_cut_deterministic(&check, &oracle);
        crate::invariant!(is_cd, "engine postcondition violated: result is not cut-deterministic");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Edge as Ed;

    fn aps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn deterministic_buchi_input_is_unchanged_up_to_ids() {
        let idx = MintermIndexer::new(&aps(&["a"])).unwrap();
        let t = idx.bdd_vars().mk_true();
        let src = Automaton::new(
            vec![vec![Ed {
                dst: 0,
                cond: t,
                acc: [0].into_iter().collect(),
            }]],
            0,
            1,
            aps(&["a"]),
        );
        let result = build(&src, &idx, &Options::default());
        assert_eq!(result.num_states(), 1);
        assert_eq!(result.states[0].len(), 1);
        assert_eq!(result.states[0][0].dst, 0);
        assert!(result.states[0][0].acc.contains(&0));
    }

    #[test]
    fn safety_input_passed_through_has_single_state() {
        let idx = MintermIndexer::new(&aps(&["a"])).unwrap();
        let t = idx.bdd_vars().mk_true();
        let src = Automaton::new(vec![vec![Ed::unmarked(0, t)]], 0, 0, aps(&["a"]));
        let result = build(&src, &idx, &Options::default());
        assert_eq!(result.num_states(), 1);
    }

    #[test]
    fn nondeterministic_gfa_gfb_builds_breakpoint_states() {
        let idx = MintermIndexer::new(&aps(&["a", "b"])).unwrap();
        let vars = idx.bdd_vars();
        let a = vars.mk_var(vars.var_by_name("a").unwrap());
        let b = vars.mk_var(vars.var_by_name("b").unwrap());
        let t = vars.mk_true();
        let edges = vec![
            vec![
                Ed::unmarked(0, t),
                Ed::unmarked(1, a.clone()),
                Ed::unmarked(2, b.clone()),
            ],
            vec![Ed {
                dst: 1,
                cond: a,
                acc: [0].into_iter().collect(),
            }],
            vec![Ed {
                dst: 2,
                cond: b,
                acc: [1].into_iter().collect(),
            }],
        ];
        let src = Automaton::new(edges, 0, 2, aps(&["a", "b"]));
        let result = build(&src, &idx, &Options::default());
        assert!(result
            .kinds
            .iter()
            .any(|k| matches!(k, StateKind::Breakpoint(_))));
        assert!(result.num_states() > 1);
    }

    #[test]
    fn weak_scc_uses_powerset_second_component() {
        // A single weak accepting self-loop under 'a', with `reuse_scc`
        // turned off so the weak scc can't take the higher-precedence
        // reuse path instead (both apply to a single-edge self-loop).
        let idx = MintermIndexer::new(&aps(&["a"])).unwrap();
        let vars = idx.bdd_vars();
        let a = vars.mk_var(vars.var_by_name("a").unwrap());
        let edges = vec![vec![Ed {
            dst: 0,
            cond: a,
            acc: [0].into_iter().collect(),
        }]];
        let src = Automaton::new(edges, 0, 1, aps(&["a"]));
        let options = Options {
            reuse_scc: false,
            ..Options::default()
        };
        let result = build(&src, &idx, &options);
        assert!(result
            .kinds
            .iter()
            .any(|k| matches!(k, StateKind::SecondPowerset(_))));
    }

    #[test]
    fn reusable_bscc_copies_edges_verbatim() {
        // A deterministic, accepting bottom scc reachable from a
        // nondeterministic entry state.
        let idx = MintermIndexer::new(&aps(&["a", "b"])).unwrap();
        let vars = idx.bdd_vars();
        let a = vars.mk_var(vars.var_by_name("a").unwrap());
        let b = vars.mk_var(vars.var_by_name("b").unwrap());
        let edges = vec![
            vec![Ed::unmarked(0, a.clone()), Ed::unmarked(1, b.clone())],
            vec![Ed {
                dst: 1,
                cond: b,
                acc: [0].into_iter().collect(),
            }],
        ];
        let src = Automaton::new(edges, 0, 1, aps(&["a", "b"]));
        let result = build(&src, &idx, &Options::default());
        assert!(result.kinds.iter().any(|k| matches!(k, StateKind::Reused(1))));
    }

    #[test]
    fn cut_det_request_yields_cut_deterministic_result() {
        // A nondeterministic branch under 'a' into two
        // accepting self-loops, cut_det requested.
        let idx = MintermIndexer::new(&aps(&["a"])).unwrap();
        let vars = idx.bdd_vars();
        let a = vars.mk_var(vars.var_by_name("a").unwrap());
        let edges = vec![
            vec![Ed::unmarked(1, a.clone()), Ed::unmarked(2, a.clone())],
            vec![Ed {
                dst: 1,
                cond: a.clone(),
                acc: [0].into_iter().collect(),
            }],
            vec![Ed {
                dst: 2,
                cond: a,
                acc: [0].into_iter().collect(),
            }],
        ];
        let src = Automaton::new(edges, 0, 1, aps(&["a"]));
        let options = Options {
            cut_det: true,
            ..Options::default()
        };
        let result = build(&src, &idx, &options);
        let check = Automaton::new(
            result.states.clone(),
            result.initial,
            result.num_marks,
            result.ap_names.clone(),
        );
        let oracle = SccOracle::new(&check);
        let (is_cd, _) = crate::cutdet::is_cut_deterministic(&check, &oracle);
        assert!(is_cd);
    }

    #[test]
    fn pure_options_disable_every_optimization_but_scc_aware() {
        let options = Options::pure(false);
        assert!(options.scc_aware);
        assert!(!options.powerset_for_weak);
        assert!(!options.powerset_on_cut);
        assert!(!options.jump_to_bottommost);
        assert!(!options.reuse_scc);
        assert!(!options.bscc_avoid);
        assert!(!options.skip_levels);
        assert!(!options.cut_always);
        assert!(!options.cut_on_scc_entry);
    }
}
