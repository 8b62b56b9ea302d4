/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Command-line surface: the flag table, parsed with `clap`'s derive
//! API. This module only parses; [`crate::driver`] decides what the flags
//! mean.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Parse `--flag` / `--flag=0` / `--flag=1` into a bool, defaulting to `true`
/// when the flag is given with no value (the `[=0|1]` flags).
fn bool01(s: &str) -> Result<bool, String> {
    match s {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(format!("expected 0 or 1, got {other:?}")),
    }
}

/// Output shape: state-Buchi, transition-Buchi, or transition-GBA (`--ba`/`--tba`/`--tgba`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputShape {
    /// State-based Buchi acceptance.
    Ba,
    /// Transition-based Buchi acceptance.
    Tba,
    /// Transition-based generalized Buchi acceptance (default).
    #[default]
    Tgba,
}

/// Which job variants to run; the driver keeps the smallest result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Variants {
    /// Run the construction that targets a TGBA output.
    pub via_tgba: bool,
    /// Run the construction that targets a TBA output.
    pub via_tba: bool,
    /// Run the construction that targets an SBA output.
    pub via_sba: bool,
}

impl Default for Variants {
    fn default() -> Self {
        Self {
            via_tgba: true,
            via_tba: true,
            via_sba: true,
        }
    }
}

/// When to cut from the first to the second component.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum CutPolicy {
    /// Cut on every edge into an accepting scc.
    CutAlways,
    /// Cut whenever an edge crosses into a different accepting scc.
    CutOnSccEntry,
    /// Cut only on the highest-mark edges into an accepting scc (default).
    #[default]
    CutHighestMark,
}

/// NCSB complementation variant (`--complement`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ComplementMode {
    /// Run both variants, keep whichever has fewer states.
    Best,
    /// Base NCSB rules only.
    Spot,
    /// Base rules plus the PLDI S'-branching optimization.
    Pldi,
}

/// Transform a TGBA into an equivalent semi-deterministic or cut-deterministic
/// Buchi automaton, optionally complementing the result.
#[derive(Parser, Debug)]
#[command(name = "seminize", version, about)]
pub struct Cli {
    /// Input automaton files; reads standard input when none are given.
    #[arg(short = 'f', long = "file")]
    pub files: Vec<PathBuf>,

    /// Produce a cut-deterministic result.
    #[arg(long, conflicts_with = "sd")]
    pub cd: bool,
    /// Produce a semi-deterministic result (default).
    #[arg(long, conflicts_with = "cd")]
    pub sd: bool,

    /// Output state-Buchi acceptance.
    #[arg(long, conflicts_with_all = ["tba", "tgba"])]
    pub ba: bool,
    /// Output transition-Buchi acceptance.
    #[arg(long, conflicts_with_all = ["ba", "tgba"])]
    pub tba: bool,
    /// Output transition-GBA acceptance (default).
    #[arg(long, conflicts_with_all = ["ba", "tba"])]
    pub tgba: bool,

    /// Include the TGBA-targeting job.
    #[arg(long)]
    pub via_tgba: bool,
    /// Include the TBA-targeting job.
    #[arg(long)]
    pub via_tba: bool,
    /// Include the SBA-targeting job.
    #[arg(long)]
    pub via_sba: bool,

    /// Cut-edge policy: cut on every candidate edge.
    #[arg(long = "cut-always", action = ArgAction::SetTrue, conflicts_with_all = ["cut_on_scc_entry", "cut_highest_mark"])]
    pub cut_always: bool,
    /// Cut-edge policy: cut only on scc-entry edges.
    #[arg(long = "cut-on-SCC-entry", action = ArgAction::SetTrue, conflicts_with_all = ["cut_always", "cut_highest_mark"])]
    pub cut_on_scc_entry: bool,
    /// Cut-edge policy: cut on scc-entry edges, skipping redundant levels (default).
    #[arg(long = "cut-highest-mark", action = ArgAction::SetTrue, conflicts_with_all = ["cut_always", "cut_on_scc_entry"])]
    pub cut_highest_mark: bool,

    /// Use a powerset second-component state for inherently weak sccs.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub powerset_for_weak: Option<bool>,
    /// Compute cut-edge successors via one powerset/breakpoint step.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub powerset_on_cut: Option<bool>,
    /// Run the "remove useless prefixes" pass after construction.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub jump_to_bottommost: Option<bool>,
    /// Let `avoid(scc)` gate cut-edge targets and first-component filtering.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub bscc_avoid: Option<bool>,
    /// Reuse already-deterministic, avoidable sccs verbatim.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub reuse_deterministic: Option<bool>,
    /// Advance the level past more than one mark in a single step.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub skip_levels: Option<bool>,
    /// Restrict powerset/breakpoint successors to the target scc.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub scc_aware: Option<bool>,

    /// Equivalent to `--scc-aware=0`.
    #[arg(long)]
    pub scc0: bool,
    /// Equivalent to `--scc-aware=0`.
    #[arg(long = "no-scc-aware")]
    pub no_scc_aware: bool,

    /// Disable every optimization except scc-awareness; disable pre/post
    /// simplification; disable `cut_always`/`cut_on_scc_entry`.
    #[arg(long)]
    pub pure: bool,

    /// Run the external preprocessing simplification stage.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub preprocess: Option<bool>,
    /// Run the external postprocessing simplification stage.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub postprocess: Option<bool>,
    /// Run the external postprocessing stage on the complement too.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = bool01)]
    pub postprocess_comp: Option<bool>,

    /// Shorthand: `--preprocess=0 --postprocess=0 --postprocess-comp=0`.
    #[arg(long = "no-reductions", alias = "s0")]
    pub no_reductions: bool,

    /// Emit only inputs that pass the cut-determinism check; no transformation.
    #[arg(long)]
    pub is_cd: bool,

    /// Annotate the result with component colours.
    #[arg(long)]
    pub highlight: bool,

    /// Apply NCSB complementation after semi-determinization.
    #[arg(long, num_args = 0..=1, default_missing_value = "best")]
    pub complement: Option<ComplementMode>,
}
