/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! AP-minterm indexer: a bijection between the `2^|AP|` complete
//! assignments of the atomic propositions and contiguous indices `[0, nc)`.
//!
//! The Boolean-function library itself (`biodivine_lib_bdd`) is treated as an
//! external collaborator; this module is the narrow adapter the rest of the
//! engine actually talks to.

use crate::Error;
use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet, BddVariableSetBuilder};

/// Refuse to build an indexer past this many minterms; keeps `Vec<BitSet>`
/// caches in [`crate::powerset`] from trying to allocate something absurd.
const MAX_MINTERMS: u64 = 1 << 24;

/// Bijection between the `2^|AP|` minterms over a fixed atomic proposition
/// set and the indices `c ∈ [0, nc)`.
#[derive(Debug)]
pub struct MintermIndexer {
    vars: Vec<BddVariable>,
    bdd_vars: BddVariableSet,
    nc: usize,
}

impl MintermIndexer {
    /// Build an indexer over the given atomic propositions, in the order given.
    ///
    /// # Errors
    /// [`Error::TooManyAtomicPropositions`] if `2^ap_names.len()` would
    /// overflow the index space (or simply be unreasonably large).
    #[inline]
    pub fn new(ap_names: &[String]) -> Result<Self, Error> {
        let aps = u32::try_from(ap_names.len()).unwrap_or(u32::MAX);
        let count = 1u64
            .checked_shl(aps)
            .filter(|&c| c <= MAX_MINTERMS)
            .ok_or(Error::TooManyAtomicPropositions {
                aps,
                count: 1u64.checked_shl(aps).unwrap_or(u64::MAX),
            })?;

        let mut builder = BddVariableSetBuilder::new();
        let vars = ap_names
            .iter()
            .map(|name| builder.make_variable(name))
            .collect();
        Ok(Self {
            vars,
            bdd_vars: builder.build(),
            nc: usize::try_from(count).expect("checked against MAX_MINTERMS"),
        })
    }

    /// Number of minterms, i.e. `2^|AP|`.
    #[inline]
    #[must_use]
    pub const fn num_of_conds(&self) -> usize {
        self.nc
    }

    /// The underlying variable set, for callers that need to build non-minterm
    /// conditions (e.g. the HOA adapter parsing arbitrary edge labels).
    #[inline]
    #[must_use]
    pub const fn bdd_vars(&self) -> &BddVariableSet {
        &self.bdd_vars
    }

    /// The condition corresponding to minterm index `c`: bit `i` of `c`
    /// selects the positive or negative literal of atomic proposition `i`.
    #[inline]
    #[must_use]
    pub fn cond_of(&self, c: usize) -> Bdd {
        self.vars.iter().enumerate().fold(
            self.bdd_vars.mk_true(),
            |acc, (i, &var)| {
                let literal = if (c >> i) & 1 == 1 {
                    self.bdd_vars.mk_var(var)
                } else {
                    self.bdd_vars.mk_not_var(var)
                };
                acc.and(&literal)
            },
        )
    }

    /// The minterm index of `bdd`, if `bdd` is exactly one minterm.
    ///
    /// Returns `None` for any condition that isn't a single complete
    /// assignment (including `false`, or a condition that still leaves some
    /// atomic proposition free).
    #[inline]
    #[must_use]
    pub fn index_of(&self, bdd: &Bdd) -> Option<usize> {
        let mut c = 0usize;
        for (i, &var) in self.vars.iter().enumerate() {
            let with_true = bdd.and(&self.bdd_vars.mk_var(var));
            let with_false = bdd.and(&self.bdd_vars.mk_not_var(var));
            match (with_true.is_false(), with_false.is_false()) {
                (false, true) => c |= 1 << i,
                (true, false) => {}
                _ => return None,
            }
        }
        Some(c)
    }

    /// Split an arbitrary condition into the minterms it contains.
    #[inline]
    pub fn minterms_of(&self, bdd: &Bdd) -> impl Iterator<Item = usize> + '_ {
        (0..self.nc).filter(move |&c| !bdd.and(&self.cond_of(c)).is_false())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn round_trips_every_minterm() {
        let idx = MintermIndexer::new(&aps(&["a", "b"])).unwrap();
        assert_eq!(idx.num_of_conds(), 4);
        for c in 0..idx.num_of_conds() {
            let bdd = idx.cond_of(c);
            assert_eq!(idx.index_of(&bdd), Some(c));
        }
    }

    #[test]
    fn non_minterm_has_no_index() {
        let idx = MintermIndexer::new(&aps(&["a", "b"])).unwrap();
        let tautology = idx.bdd_vars().mk_true();
        assert_eq!(idx.index_of(&tautology), None);
    }

    #[test]
    fn minterms_of_splits_a_disjunction() {
        let idx = MintermIndexer::new(&aps(&["a", "b"])).unwrap();
        let a = idx.bdd_vars().mk_var(
            idx.bdd_vars()
                .var_by_name("a")
                .expect("variable exists"),
        );
        let covered: std::collections::BTreeSet<_> = idx.minterms_of(&a).collect();
        let expected: std::collections::BTreeSet<_> =
            (0..idx.num_of_conds()).filter(|&c| c & 1 == 1).collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn refuses_absurd_ap_counts() {
        let names: Vec<String> = (0..40).map(|i| format!("ap{i}")).collect();
        assert!(MintermIndexer::new(&names).is_err());
    }
}
