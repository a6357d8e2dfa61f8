// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The SVA sequence engine: expansion of sequence expressions into
//! finite sets of match shapes, and their instantiation at timeframes.

use crate::{cycles, CompileError};
use itertools::iproduct;
use rtl::syntax::{Bound, Delay, Expr, Repetition, Strength};
use rtl::timeframe::instantiate_property;

/// The boundary semantics a sequence is evaluated under.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Semantics {
    /// A match cut off at the unwinding boundary is no match
    Strong,
    /// A match cut off at the unwinding boundary counts
    Weak,
}

impl Semantics {
    /// The semantics a sequence-property strength asks for.
    pub fn of(strength: Strength) -> Self {
        if strength.is_strong() {
            Semantics::Strong
        } else {
            Semantics::Weak
        }
    }
}

/// One shape a sequence can match with: a condition for every cycle the
/// match spans, relative to its start.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct SequenceMatch {
    /// One condition per cycle of the match
    pub cond_vector: Vec<Expr>,
}

impl SequenceMatch {
    /// The one-cycle match of a state predicate.
    pub fn boolean(e: Expr) -> Self {
        SequenceMatch {
            cond_vector: vec![e],
        }
    }

    /// A match of `n` unconstrained cycles.
    pub fn true_match(n: usize) -> Self {
        SequenceMatch {
            cond_vector: vec![Expr::true_(); n],
        }
    }

    /// A zero-cycle match consumes no cycles at all.
    pub fn empty_match(&self) -> bool {
        self.cond_vector.is_empty()
    }

    /// The number of cycles the match spans.
    pub fn length(&self) -> usize {
        self.cond_vector.len()
    }
}

/// Non-overlapping concatenation: `b` starts the cycle after `a` ends.
pub fn concat(mut a: SequenceMatch, b: &SequenceMatch) -> SequenceMatch {
    a.cond_vector.extend(b.cond_vector.iter().cloned());
    a
}

/// `n` non-overlapping copies of `m`; zero copies is the empty match.
pub fn repeat(m: &SequenceMatch, n: usize) -> SequenceMatch {
    let mut result = SequenceMatch::default();
    for _ in 0..n {
        result.cond_vector.extend(m.cond_vector.iter().cloned());
    }
    result
}

/// Overlapping concatenation: the first cycle of `b` is the last cycle
/// of `a`, and their conditions are conjoined.
pub fn overlapping_concat(mut a: SequenceMatch, mut b: SequenceMatch) -> SequenceMatch {
    assert!(!a.empty_match());
    assert!(!b.empty_match());
    let a_last = a.cond_vector.pop().unwrap();
    b.cond_vector[0] = Expr::and([a_last, b.cond_vector[0].clone()]);
    concat(a, &b)
}

/// Expand a sequence expression into its finite set of match shapes.
/// The empty set means the sequence is not supported by this engine;
/// unbounded repetition and unbounded delay are deliberately left out.
pub fn sequence_matches(sequence: &Expr) -> Result<Vec<SequenceMatch>, CompileError> {
    match sequence {
        Expr::SvaBoolean(op) => {
            // atomic proposition
            Ok(vec![SequenceMatch::boolean((**op).clone())])
        }
        Expr::SeqConcat(lhs, rhs) => {
            let matches_lhs = sequence_matches(lhs)?;
            let matches_rhs = sequence_matches(rhs)?;

            if matches_lhs.is_empty() || matches_rhs.is_empty() {
                return Ok(vec![]);
            }

            let mut result = vec![];

            // cross product; sequence concatenation is overlapping
            for (match_lhs, match_rhs) in iproduct!(&matches_lhs, &matches_rhs) {
                let new_match = overlapping_concat(match_lhs.clone(), match_rhs.clone());
                debug_assert_eq!(
                    new_match.length(),
                    match_lhs.length() + match_rhs.length() - 1,
                );
                result.push(new_match);
            }
            Ok(result)
        }
        Expr::SeqRepeat { op, repetition } => {
            let matches_op = sequence_matches(op)?;

            if matches_op.is_empty() {
                return Ok(vec![]);
            }

            match repetition {
                Repetition::Any => Ok(vec![]), // no support
                Repetition::Count(n) => {
                    let n = cycles(*n)?;
                    Ok(matches_op.iter().map(|m| repeat(m, n)).collect())
                }
                Repetition::Range(_, Bound::Unbounded) => Ok(vec![]), // no support
                Repetition::Range(from, Bound::Finite(to)) => {
                    let from = cycles(*from)?;
                    let to = cycles(*to)?;
                    let mut result = vec![];
                    for n in from..to {
                        for m in &matches_op {
                            result.push(repeat(m, n));
                        }
                    }
                    Ok(result)
                }
            }
        }
        Expr::SeqDelay { delay, op } => {
            let matches = sequence_matches(op)?;

            if matches.is_empty() {
                return Ok(vec![]);
            }

            match delay {
                Delay::Exact(n) => {
                    // delay as instructed
                    let delay_sequence = SequenceMatch::true_match(cycles(*n)?);
                    Ok(matches
                        .iter()
                        .map(|m| concat(delay_sequence.clone(), m))
                        .collect())
                }
                Delay::Range(_, Bound::Unbounded) => Ok(vec![]), // can't encode
                Delay::Range(from, Bound::Finite(to)) => {
                    let from = cycles(*from)?;
                    let to = cycles(*to)?;
                    let mut new_matches = vec![];
                    for i in from..=to {
                        let delay_sequence = SequenceMatch::true_match(i);
                        for m in &matches {
                            new_matches.push(concat(delay_sequence.clone(), m));
                        }
                    }
                    Ok(new_matches)
                }
            }
        }
        Expr::SeqAnd(lhs, rhs) => {
            // 1. Both operands must match.
            // 2. Both sequences start at the same time.
            // 3. The end time of the composite sequence is the end time
            //    of the operand sequence that completes last.
            let matches_lhs = sequence_matches(lhs)?;
            let matches_rhs = sequence_matches(rhs)?;

            if matches_lhs.is_empty() || matches_rhs.is_empty() {
                return Ok(vec![]);
            }

            let mut result = vec![];

            for (match_lhs, match_rhs) in iproduct!(&matches_lhs, &matches_rhs) {
                let new_length = match_lhs.length().max(match_rhs.length());
                let mut new_match = SequenceMatch::default();
                for i in 0..new_length {
                    let conjuncts = [match_lhs, match_rhs]
                        .into_iter()
                        .filter_map(|m| m.cond_vector.get(i).cloned());
                    new_match.cond_vector.push(Expr::and(conjuncts));
                }
                result.push(new_match);
            }
            Ok(result)
        }
        Expr::SeqOr(ops) => {
            // the match set of a union is the union of the match sets
            let mut result = vec![];
            for op in ops {
                let op_matches = sequence_matches(op)?;
                if op_matches.is_empty() {
                    return Ok(vec![]); // not supported
                }
                result.extend(op_matches);
            }
            Ok(result)
        }
        _ => Ok(vec![]), // unsupported
    }
}

/// One way a sequence matches when started at a concrete timeframe: the
/// frame the match ends in, and the instantiated condition for it.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MatchPoint {
    /// The frame the match ends in
    pub end_time: usize,
    /// The per-cycle conditions, instantiated and conjoined
    pub condition: Expr,
    empty: bool,
}

impl MatchPoint {
    /// Whether this is a zero-cycle match.
    pub fn empty_match(&self) -> bool {
        self.empty
    }
}

/// Instantiate the matches of `sequence` starting at frame `t`. Matches
/// that run past the last frame are kept truncated under weak semantics
/// and dropped under strong semantics. Fails with
/// [`CompileError::Unsupported`] when the engine cannot expand the
/// sequence at all.
pub fn instantiate_sequence(
    sequence: &Expr,
    semantics: Semantics,
    t: usize,
    no_timeframes: usize,
) -> Result<Vec<MatchPoint>, CompileError> {
    debug_assert!(t < no_timeframes);

    let matches = sequence_matches(sequence)?;
    if matches.is_empty() {
        return Err(CompileError::Unsupported);
    }

    let mut match_points = vec![];

    for m in matches {
        if m.empty_match() {
            match_points.push(MatchPoint {
                end_time: t,
                condition: Expr::true_(),
                empty: true,
            });
            continue;
        }

        let end_time = t + m.length() - 1;

        if end_time < no_timeframes {
            let condition = Expr::and(
                m.cond_vector
                    .iter()
                    .enumerate()
                    .map(|(i, cond)| instantiate_property(cond, t + i, no_timeframes)),
            );
            match_points.push(MatchPoint {
                end_time,
                condition,
                empty: false,
            });
        } else if semantics == Semantics::Weak {
            // the suffix beyond the last frame is vacuously accepted
            let condition = Expr::and(
                m.cond_vector
                    .iter()
                    .enumerate()
                    .take_while(|(i, _)| t + i < no_timeframes)
                    .map(|(i, cond)| instantiate_property(cond, t + i, no_timeframes)),
            );
            match_points.push(MatchPoint {
                end_time: no_timeframes - 1,
                condition,
                empty: false,
            });
        }
        // strong semantics: a match that cannot complete is dropped
    }

    Ok(match_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::parser::term;

    fn matches(src: &str) -> Vec<SequenceMatch> {
        let e = term(src);
        let sequence = match &e {
            Expr::SvaSequence { sequence, .. } => sequence.as_ref(),
            e => e,
        };
        sequence_matches(sequence).unwrap()
    }

    #[test]
    fn test_boolean_is_a_single_one_cycle_match() {
        let ms = matches("weak(r)");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].cond_vector, vec![term("r")]);
    }

    #[test]
    fn test_concat_lengths() {
        // ##1 makes the concatenation non-overlapping overall
        let ms = matches("weak(r ##1 q)");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].length(), 2);

        let ms = matches("weak(r ##0 q)");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].length(), 1);
        assert_eq!(ms[0].cond_vector[0], Expr::and([term("r"), term("q")]));
    }

    #[test]
    fn test_repeat_lengths() {
        let ms = matches("weak((r ##1 q)[*3])");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].length(), 6);

        let ms = matches("weak(r[*0])");
        assert_eq!(ms.len(), 1);
        assert!(ms[0].empty_match());
    }

    #[test]
    fn test_repeat_range_is_half_open() {
        let ms = matches("weak(r[*1:3])");
        let lengths: Vec<usize> = ms.iter().map(|m| m.length()).collect();
        assert_eq!(lengths, vec![1, 2]);
    }

    #[test]
    fn test_delay_range() {
        let ms = matches("weak(##[0:2] r)");
        let lengths: Vec<usize> = ms.iter().map(|m| m.length()).collect();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[test]
    fn test_or_is_set_union() {
        let lhs = matches("weak(r ##1 q)");
        let rhs = matches("weak(q[*2])");
        let both = matches("weak(r ##1 q or q[*2])");
        assert_eq!(both.len(), lhs.len() + rhs.len());
        assert_eq!(both[0], lhs[0]);
        assert_eq!(both[1], rhs[0]);
    }

    #[test]
    fn test_and_pads_the_shorter_operand() {
        let ms = matches("weak(r[*2] and q)");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].length(), 2);
        assert_eq!(ms[0].cond_vector[0], Expr::and([term("r"), term("q")]));
        assert_eq!(ms[0].cond_vector[1], term("r"));
    }

    #[test]
    fn test_unbounded_forms_are_unsupported() {
        assert!(matches("weak(r[*])").is_empty());
        assert!(matches("weak(r[*1:$])").is_empty());
        assert!(matches("weak(##[1:$] r)").is_empty());
    }

    #[test]
    fn test_negative_counts_are_rejected() {
        let e = term("weak(r[*-1])");
        let sequence = match &e {
            Expr::SvaSequence { sequence, .. } => sequence.as_ref(),
            e => e,
        };
        assert_eq!(
            sequence_matches(sequence),
            Err(CompileError::IndexOutOfRange),
        );
    }

    #[test]
    fn test_instantiate_sequence_strong_drops_boundary_matches() {
        let e = term("weak(r ##1 q)");
        let sequence = match &e {
            Expr::SvaSequence { sequence, .. } => sequence.as_ref(),
            e => e,
        };
        // two frames are enough when starting at 0
        let strong = instantiate_sequence(sequence, Semantics::Strong, 0, 2).unwrap();
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].end_time, 1);
        assert_eq!(
            strong[0].condition,
            Expr::and([Expr::id("r@0"), Expr::id("q@1")]),
        );

        // starting at 1 the match crosses the boundary
        let strong = instantiate_sequence(sequence, Semantics::Strong, 1, 2).unwrap();
        assert!(strong.is_empty());

        // weak semantics keeps the truncated prefix instead
        let weak = instantiate_sequence(sequence, Semantics::Weak, 1, 2).unwrap();
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].end_time, 1);
        assert_eq!(weak[0].condition, Expr::id("r@1"));
    }
}
