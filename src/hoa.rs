/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! HOA automaton format adapter: the narrow boundary
//! between automaton text and [`seminize_automata::Automaton`] /
//! [`seminize_automata::automaton::ResultAutomaton`].
//!
//! This reads and writes the HOA subset the driver actually needs
//! (generalized-Buchi acceptance on input, Buchi-shaped acceptance on
//! output) directly against the text grammar rather than through a general
//! parsing library (see `DESIGN.md` for why).

use crate::cli::OutputShape;
use seminize_automata::automaton::{Acceptance, ResultAutomaton, StateKind};
use seminize_automata::{Automaton, Edge, MintermIndexer};

/// A parse failure, with enough detail for [`crate::error::Error::HoaParse`].
#[derive(Debug)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse one HOA automaton. Only the subset this driver needs is accepted:
/// a single `HOA: v1` document with a generalized-Buchi acceptance
/// condition (`Acceptance: k Inf(0)&Inf(1)&...&Inf(k-1)`).
pub fn parse(text: &str) -> Result<(Automaton, MintermIndexer), ParseError> {
    let mut ap_names: Vec<String> = Vec::new();
    let mut num_states = 0usize;
    let mut initial = 0usize;
    let mut num_marks = 0usize;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("HOA:") {
            continue;
        }
        if line == "--BODY--" {
            in_body = true;
            continue;
        }
        if line == "--END--" {
            break;
        }
        if in_body {
            body_lines.push(line);
            continue;
        }
        if let Some(rest) = line.strip_prefix("States:") {
            num_states = rest
                .trim()
                .parse()
                .map_err(|_| ParseError(format!("bad States header: {line:?}")))?;
        } else if let Some(rest) = line.strip_prefix("Start:") {
            initial = rest
                .trim()
                .parse()
                .map_err(|_| ParseError(format!("bad Start header: {line:?}")))?;
        } else if let Some(rest) = line.strip_prefix("AP:") {
            ap_names = parse_ap_header(rest)?;
        } else if let Some(rest) = line.strip_prefix("Acceptance:") {
            num_marks = parse_generalized_buchi_acceptance(rest)?;
        }
        // Other headers (`acc-name:`, `tool:`, `name:`, ...) are accepted
        // and ignored; this driver round-trips semantics, not metadata.
    }

    if ap_names.is_empty() {
        return Err(ParseError("missing AP header".to_owned()));
    }
    let minterms = MintermIndexer::new(&ap_names)
        .map_err(|e| ParseError(format!("building minterm indexer: {e}")))?;

    let mut states: Vec<Vec<Edge>> = vec![Vec::new(); num_states];
    let mut cur: Option<usize> = None;
    for line in body_lines {
        if let Some(rest) = line.strip_prefix("State:") {
            let id: usize = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| ParseError(format!("empty State line: {line:?}")))?
                .parse()
                .map_err(|_| ParseError(format!("bad State line: {line:?}")))?;
            cur = Some(id);
        } else {
            let src = cur.ok_or_else(|| ParseError(format!("edge before any State: {line:?}")))?;
            let edge = parse_edge(line, &minterms, &ap_names)?;
            states[src].push(edge);
        }
    }

    Ok((Automaton::new(states, initial, num_marks, ap_names), minterms))
}

fn parse_ap_header(rest: &str) -> Result<Vec<String>, ParseError> {
    let mut parts = rest.split_whitespace();
    let count: usize = parts
        .next()
        .ok_or_else(|| ParseError("empty AP header".to_owned()))?
        .parse()
        .map_err(|_| ParseError(format!("bad AP count in {rest:?}")))?;
    let names: Vec<String> = parts
        .map(|p| p.trim_matches('"').to_owned())
        .collect();
    if names.len() != count {
        return Err(ParseError(format!(
            "AP header declared {count} names but listed {}",
            names.len()
        )));
    }
    Ok(names)
}

/// Accept only `k Inf(0)&Inf(1)&...&Inf(k-1)`, in any order of conjuncts,
/// which is the shape every generalized-Buchi input must have (input
/// is not a generalized Buchi automaton").
fn parse_generalized_buchi_acceptance(rest: &str) -> Result<usize, ParseError> {
    let mut parts = rest.trim().splitn(2, char::is_whitespace);
    let k: usize = parts
        .next()
        .ok_or_else(|| ParseError("empty Acceptance header".to_owned()))?
        .parse()
        .map_err(|_| ParseError(format!("bad acceptance count in {rest:?}")))?;
    let cond = parts.next().unwrap_or("").trim();
    if k == 0 {
        if !cond.is_empty() && cond != "t" {
            return Err(ParseError(format!("k=0 acceptance must be `t`, got {cond:?}")));
        }
        return Ok(0);
    }
    let mut seen = vec![false; k];
    for term in cond.split('&') {
        let term = term.trim();
        let idx = term
            .strip_prefix("Inf(")
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| ParseError(format!("non-generalized-Buchi acceptance: {rest:?}")))?
            .parse::<usize>()
            .map_err(|_| ParseError(format!("bad Inf(...) index in {term:?}")))?;
        if idx >= k {
            return Err(ParseError(format!("Inf({idx}) out of range for k={k}")));
        }
        seen[idx] = true;
    }
    if seen.iter().any(|&s| !s) {
        return Err(ParseError(format!(
            "acceptance condition does not cover every mark 0..{k}: {rest:?}"
        )));
    }
    Ok(k)
}

/// Parse one body line: `[label] dst {acc}`.
fn parse_edge(line: &str, minterms: &MintermIndexer, ap_names: &[String]) -> Result<Edge, ParseError> {
    let rest = line
        .strip_prefix('[')
        .ok_or_else(|| ParseError(format!("edge missing label: {line:?}")))?;
    let close = rest
        .find(']')
        .ok_or_else(|| ParseError(format!("unterminated label: {line:?}")))?;
    let label = &rest[..close];
    let tail = rest[close + 1..].trim();

    let (dst_str, acc_str) = match tail.find('{') {
        Some(brace) => (tail[..brace].trim(), Some(&tail[brace + 1..])),
        None => (tail, None),
    };
    let dst: usize = dst_str
        .parse()
        .map_err(|_| ParseError(format!("bad destination in {line:?}")))?;

    let cond = parse_label(label, minterms, ap_names)?;

    let mut acc = Acceptance::new();
    if let Some(acc_str) = acc_str {
        let acc_str = acc_str.trim_end_matches('}').trim();
        for tok in acc_str.split_whitespace() {
            let mark: usize = tok
                .parse()
                .map_err(|_| ParseError(format!("bad acceptance mark in {line:?}")))?;
            acc.insert(mark);
        }
    }

    Ok(Edge { dst, cond, acc })
}

/// Recursive-descent parser for a HOA label expression over AP indices:
/// `t`, `f`, `N`, `!expr`, `(expr)`, `expr & expr`, `expr | expr`.
fn parse_label(
    label: &str,
    minterms: &MintermIndexer,
    ap_names: &[String],
) -> Result<biodivine_lib_bdd::Bdd, ParseError> {
    let tokens: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pos = 0usize;
    let bdd = parse_or(&tokens, &mut pos, minterms, ap_names)?;
    if pos != tokens.len() {
        return Err(ParseError(format!("trailing characters in label {label:?}")));
    }
    Ok(bdd)
}

fn parse_or(
    tokens: &[char],
    pos: &mut usize,
    minterms: &MintermIndexer,
    ap_names: &[String],
) -> Result<biodivine_lib_bdd::Bdd, ParseError> {
    let mut lhs = parse_and(tokens, pos, minterms, ap_names)?;
    while tokens.get(*pos) == Some(&'|') {
        *pos += 1;
        let rhs = parse_and(tokens, pos, minterms, ap_names)?;
        lhs = lhs.or(&rhs);
    }
    Ok(lhs)
}

fn parse_and(
    tokens: &[char],
    pos: &mut usize,
    minterms: &MintermIndexer,
    ap_names: &[String],
) -> Result<biodivine_lib_bdd::Bdd, ParseError> {
    let mut lhs = parse_atom(tokens, pos, minterms, ap_names)?;
    while tokens.get(*pos) == Some(&'&') {
        *pos += 1;
        let rhs = parse_atom(tokens, pos, minterms, ap_names)?;
        lhs = lhs.and(&rhs);
    }
    Ok(lhs)
}

fn parse_atom(
    tokens: &[char],
    pos: &mut usize,
    minterms: &MintermIndexer,
    ap_names: &[String],
) -> Result<biodivine_lib_bdd::Bdd, ParseError> {
    match tokens.get(*pos) {
        Some('!') => {
            *pos += 1;
            let inner = parse_atom(tokens, pos, minterms, ap_names)?;
            Ok(inner.not())
        }
        Some('(') => {
            *pos += 1;
            let inner = parse_or(tokens, pos, minterms, ap_names)?;
            if tokens.get(*pos) != Some(&')') {
                return Err(ParseError("unbalanced parentheses in label".to_owned()));
            }
            *pos += 1;
            Ok(inner)
        }
        Some('t') => {
            *pos += 1;
            Ok(minterms.bdd_vars().mk_true())
        }
        Some('f') => {
            *pos += 1;
            Ok(minterms.bdd_vars().mk_false())
        }
        Some(c) if c.is_ascii_digit() => {
            let start = *pos;
            while tokens.get(*pos).is_some_and(char::is_ascii_digit) {
                *pos += 1;
            }
            let idx: usize = tokens[start..*pos]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| ParseError("bad AP index in label".to_owned()))?;
            if idx >= ap_names.len() {
                return Err(ParseError(format!("AP index {idx} out of range")));
            }
            let var = minterms
                .bdd_vars()
                .var_by_name(&ap_names[idx])
                .ok_or_else(|| ParseError(format!("unknown AP {idx}")))?;
            Ok(minterms.bdd_vars().mk_var(var))
        }
        other => Err(ParseError(format!("unexpected token {other:?} in label"))),
    }
}

/// Serialize a result automaton as HOA text.
///
/// `shape` only affects the `Acceptance:` header and how many marks are
/// written; the driver has already degeneralized/state-split the result to
/// match `shape` by the time this is called. `highlight` adds a
/// `spot-highlight-states:` header coloring first- and second-component
/// states, matching the convention spot-family tools use for `--highlight`.
#[must_use]
pub fn write(result: &ResultAutomaton, minterms: &MintermIndexer, shape: OutputShape, highlight: bool) -> String {
    let mut out = String::new();
    out.push_str("HOA: v1\n");
    out.push_str(&format!("States: {}\n", result.num_states()));
    out.push_str(&format!("Start: {}\n", result.initial));
    out.push_str(&format!("AP: {}", result.ap_names.len()));
    for name in &result.ap_names {
        out.push_str(&format!(" \"{name}\""));
    }
    out.push('\n');

    match shape {
        OutputShape::Tgba => {
            let terms: Vec<String> = (0..result.num_marks.max(1))
                .map(|i| format!("Inf({i})"))
                .collect();
            out.push_str(&format!(
                "Acceptance: {} {}\n",
                result.num_marks.max(1),
                terms.join("&")
            ));
            out.push_str("acc-name: generalized-Buchi\n");
        }
        OutputShape::Tba | OutputShape::Ba => {
            out.push_str("Acceptance: 1 Inf(0)\n");
            out.push_str("acc-name: Buchi\n");
        }
    }
    out.push_str("properties: trans-labels explicit-labels trans-acc\n");

    if highlight {
        let mut pairs = Vec::new();
        for (id, kind) in result.kinds.iter().enumerate() {
            let color = usize::from(kind.is_second_component());
            pairs.push(format!("{id} {color}"));
        }
        if !pairs.is_empty() {
            out.push_str(&format!("spot-highlight-states: {}\n", pairs.join(" ")));
        }
    }

    out.push_str("--BODY--\n");
    for (id, edges) in result.states.iter().enumerate() {
        out.push_str(&format!("State: {id}"));
        if highlight {
            if let Some(kind) = result.kinds.get(id) {
                out.push_str(&format!(" \"{}\"", kind.describe()));
            }
        }
        out.push('\n');
        for edge in edges {
            out.push_str(&format!(
                "[{}] {}",
                bdd_to_label(&edge.cond, minterms, result.ap_names.len()),
                edge.dst
            ));
            if !edge.acc.is_empty() {
                let marks: Vec<String> = edge.acc.iter().map(ToString::to_string).collect();
                out.push_str(&format!(" {{{}}}", marks.join(" ")));
            }
            out.push('\n');
        }
    }
    out.push_str("--END--\n");
    out
}

/// Render a condition back to HOA label syntax as the disjunction of the
/// minterms it covers (enumeration order must stay deterministic here too:
/// minterms are visited in index order, so output is reproducible). Each
/// minterm becomes one full conjunction of literals; this never tries to
/// find a smaller equivalent formula.
fn bdd_to_label(cond: &biodivine_lib_bdd::Bdd, minterms: &MintermIndexer, num_aps: usize) -> String {
    if cond.is_true() {
        return "t".to_owned();
    }
    if cond.is_false() {
        return "f".to_owned();
    }
    let clauses: Vec<String> = minterms
        .minterms_of(cond)
        .map(|c| {
            let literals: Vec<String> = (0..num_aps)
                .map(|i| if (c >> i) & 1 == 1 { i.to_string() } else { format!("!{i}") })
                .collect();
            if literals.is_empty() {
                "t".to_owned()
            } else {
                literals.join("&")
            }
        })
        .collect();
    clauses.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFA_GFB: &str = r#"HOA: v1
States: 3
Start: 0
AP: 2 "a" "b"
Acceptance: 2 Inf(0)&Inf(1)
--BODY--
State: 0
[t] 0
[0] 1
[1] 2
State: 1
[0] 1 {0}
State: 2
[1] 2 {1}
--END--
"#;

    #[test]
    fn parses_the_gfa_gfb_scenario() {
        let (automaton, minterms) = parse(GFA_GFB).unwrap();
        assert_eq!(automaton.num_states(), 3);
        assert_eq!(automaton.initial(), 0);
        assert_eq!(automaton.num_marks(), 2);
        assert_eq!(minterms.num_of_conds(), 4);
        assert_eq!(automaton.edges(0).len(), 3);
    }

    #[test]
    fn rejects_a_non_generalized_buchi_acceptance() {
        let text = GFA_GFB.replace("Acceptance: 2 Inf(0)&Inf(1)", "Acceptance: 1 Fin(0)");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn write_then_parse_round_trips_structure() {
        let (automaton, minterms) = parse(GFA_GFB).unwrap();
        let result = ResultAutomaton {
            states: (0..automaton.num_states())
                .map(|s| automaton.edges(s).to_vec())
                .collect(),
            kinds: (0..automaton.num_states()).map(StateKind::Simple).collect(),
            initial: automaton.initial(),
            num_marks: automaton.num_marks(),
            ap_names: automaton.ap_names().to_vec(),
        };
        let text = write(&result, &minterms, OutputShape::Tgba, false);
        let (reparsed, _) = parse(&text).unwrap();
        assert_eq!(reparsed.num_states(), automaton.num_states());
        assert_eq!(reparsed.initial(), automaton.initial());
    }
}
