// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Compiling a temporal property into obligations over the frames of a
//! bounded unwinding.

use crate::sequence::{instantiate_sequence, Semantics};
use crate::set::Obligations;
use crate::{cycles, CompileError};
use rtl::nnf::negate_property_node;
use rtl::syntax::{BinOp, Bound, Expr, NOp, UOp};
use rtl::temporal::{has_ctl_operator, has_temporal_operator, is_ctl, is_ltl, is_sva, is_temporal_operator};
use rtl::timeframe::{instantiate_property, lasso_symbol};
use solver::DecisionProcedure;

/// Whether the bounded unwinding can check this property at all. LTL and
/// SVA properties are supported wholesale; of CTL, only the fragment
/// shared with LTL (state predicates, conjunction, `AX`, `AF`, `AG`)
/// following Maidl, "The common fragment of CTL and LTL".
pub fn supports_property(e: &Expr) -> bool {
    if is_ltl(e) {
        true
    } else if is_ctl(e) {
        supports_ctl_property(e)
    } else if is_sva(e) {
        true
    } else {
        false // unknown category
    }
}

fn supports_ctl_property(e: &Expr) -> bool {
    if !has_ctl_operator(e) {
        true
    } else {
        match e {
            Expr::NAryOp(NOp::And, es) => es.iter().all(supports_ctl_property),
            Expr::UnaryOp(UOp::AX | UOp::AF | UOp::AG, op) => supports_ctl_property(op),
            _ => false,
        }
    }
}

/// Whether compiling this property introduces lasso symbols, so that the
/// unwinder knows to define them.
pub fn requires_lasso_constraints(e: &Expr) -> bool {
    e.contains(&|e| {
        matches!(
            e,
            Expr::UnaryOp(UOp::Eventually | UOp::AF | UOp::SvaSEventually, _)
        )
    })
}

/// Compile `property` into obligations for the frames `[current,
/// no_timeframes)` of an unwinding. The property must be in negation
/// normal form; where it is not, compilation fails with
/// [`CompileError::NnfFailure`].
pub fn property_obligations(
    property: &Expr,
    current: usize,
    no_timeframes: usize,
) -> Result<Obligations, CompileError> {
    assert!(
        current < no_timeframes,
        "frame {current} outside the unwinding"
    );

    match property {
        Expr::UnaryOp(UOp::AG | UOp::Always | UOp::SvaAlways, phi) => {
            let mut obligations = Obligations::new();
            for c in current..no_timeframes {
                obligations.merge(property_obligations(phi, c, no_timeframes)?);
            }
            Ok(obligations)
        }

        Expr::SvaEventually { range, op } => {
            let from = cycles(range.from)?;
            let to = match range.to {
                Bound::Finite(n) => cycles(n)?,
                Bound::Unbounded => return Err(CompileError::UnboundedRange),
            };

            // we rely on NNF
            if current + from >= no_timeframes || current + to >= no_timeframes {
                return Ok(Obligations::single(no_timeframes - 1, Expr::true_()));
            }

            let mut disjuncts = vec![];
            for u in current + from..=current + to {
                let obligations = property_obligations(op, u, no_timeframes)?;
                disjuncts.push(obligations.conjunction().1);
            }
            Ok(Obligations::single(no_timeframes - 1, Expr::or(disjuncts)))
        }

        Expr::UnaryOp(UOp::AF | UOp::Eventually | UOp::SvaSEventually, phi) => {
            // traces with any φ state from `current` onwards satisfy F φ
            let mut phi_disjuncts = vec![];
            for j in current..no_timeframes {
                let tmp = property_obligations(phi, j, no_timeframes)?;
                phi_disjuncts.push(tmp.conjunction().1);
            }
            let phi_disjunction = Expr::or(phi_disjuncts);

            // Counterexamples to F φ must have a loop. We consider l-k
            // loops with l < k. The following needs to be satisfied for
            // a counterexample that loops back in timeframe k:
            //
            // (1) There is a loop from timeframe k back to some earlier
            //     state l with current <= l < k.
            // (2) No state j with current <= j < no_timeframes satisfies
            //     φ. The weaker alternative current <= j <= k yields
            //     counterexamples that exhibit a ¬φ loop, but are then
            //     followed by a φ state.
            let mut obligations = Obligations::new();
            for k in current + 1..no_timeframes {
                for l in current..k {
                    let tmp = Expr::or([
                        Expr::negate(lasso_symbol(l, k)),
                        phi_disjunction.clone(),
                    ]);
                    obligations.add(k, tmp);
                }
            }
            Ok(obligations)
        }

        Expr::SvaRangedSEventually { range, op } => {
            let from = cycles(range.from)?;
            let from = (no_timeframes - 1).min(current + from);

            let to = match range.to {
                Bound::Finite(n) => (current + cycles(n)?).min(no_timeframes - 1),
                Bound::Unbounded => return Err(CompileError::UnboundedRange),
            };

            let mut disjuncts = vec![];
            let mut time = 0;
            for c in from..=to {
                let tmp = property_obligations(op, c, no_timeframes)?.conjunction();
                time = time.max(tmp.0);
                disjuncts.push(tmp.1);
            }
            Ok(Obligations::single(time, Expr::or(disjuncts)))
        }

        Expr::SvaRangedAlways { range, op, .. } => {
            let from = current + cycles(range.from)?;
            let to = match range.to {
                Bound::Finite(n) => (current + cycles(n)?).min(no_timeframes - 1),
                Bound::Unbounded => no_timeframes - 1,
            };

            let mut obligations = Obligations::new();
            for c in from..=to {
                obligations.merge(property_obligations(op, c, no_timeframes)?);
            }
            Ok(obligations)
        }

        Expr::UnaryOp(UOp::Next | UOp::AX | UOp::SvaNexttime | UOp::SvaSNexttime, phi) => {
            let next = current + 1;
            if next < no_timeframes {
                property_obligations(phi, next, no_timeframes)
            } else {
                // works on NNF only
                Ok(Obligations::single(no_timeframes - 1, Expr::true_()))
            }
        }

        Expr::BinOp(BinOp::Until | BinOp::SvaSUntil, p, q) => {
            // p U q ≡ F q ∧ (p W q)
            let tmp = Expr::and([
                Expr::eventually((**q).clone()),
                Expr::BinOp(BinOp::WeakUntil, p.clone(), q.clone()),
            ]);
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::BinOp(BinOp::WeakUntil | BinOp::SvaUntil, p, q) => {
            // we expand: p W q ≡ q ∨ (p ∧ X(p W q)); once we reach the
            // end of the unwinding, X(p W q) becomes true
            let tmp = Expr::or([
                (**q).clone(),
                if current + 1 < no_timeframes {
                    Expr::and([(**p).clone(), Expr::next(property.clone())])
                } else {
                    (**p).clone()
                },
            ]);
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::BinOp(BinOp::Release, p, q) => {
            // we expand: p R q ≡ q ∧ (p ∨ X(p R q)); at the end of the
            // unwinding the expansion becomes q only
            let expansion = if current + 1 < no_timeframes {
                Expr::and([
                    (**q).clone(),
                    Expr::or([(**p).clone(), Expr::next(property.clone())]),
                ])
            } else {
                (**q).clone()
            };
            property_obligations(&expansion, current, no_timeframes)
        }

        Expr::BinOp(BinOp::StrongRelease, p, q) => {
            let tmp = Expr::and([
                Expr::eventually((**q).clone()),
                Expr::BinOp(BinOp::WeakUntil, p.clone(), q.clone()),
            ]);
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::BinOp(BinOp::SvaUntilWith, lhs, rhs) => {
            // rewrite to weak R; note that lhs and rhs are flipped
            let tmp = Expr::BinOp(BinOp::Release, rhs.clone(), lhs.clone());
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::BinOp(BinOp::SvaSUntilWith, lhs, rhs) => {
            // rewrite to strong R; note that lhs and rhs are flipped
            let tmp = Expr::BinOp(BinOp::StrongRelease, rhs.clone(), lhs.clone());
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::NAryOp(NOp::And, es) => {
            // separate obligations for each conjunct, then the union
            let mut obligations = Obligations::new();
            for op in es {
                obligations.merge(property_obligations(op, current, no_timeframes)?);
            }
            Ok(obligations)
        }

        Expr::NAryOp(NOp::Or, es) => {
            // separate obligations for each disjunct, then 'or' them
            let mut t = 0;
            let mut disjuncts = vec![];
            for op in es {
                let conjunction =
                    property_obligations(op, current, no_timeframes)?.conjunction();
                t = t.max(conjunction.0);
                disjuncts.push(conjunction.1);
            }
            Ok(Obligations::single(t, Expr::or(disjuncts)))
        }

        Expr::BinOp(BinOp::Equals | BinOp::Iff | BinOp::SvaIff, lhs, rhs) => {
            // we rely on NNF: a<->b ≡ (a->b) ∧ (b->a)
            let tmp = Expr::and([
                Expr::implies((**lhs).clone(), (**rhs).clone()),
                Expr::implies((**rhs).clone(), (**lhs).clone()),
            ]);
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::BinOp(BinOp::Implies | BinOp::SvaImplies, lhs, rhs) => {
            // we rely on NNF
            let tmp = Expr::or([Expr::negate((**lhs).clone()), (**rhs).clone()]);
            property_obligations(&tmp, current, no_timeframes)
        }

        Expr::Ite { cond, then, else_ } => {
            // we rely on NNF
            let cond = instantiate_property(cond, current, no_timeframes);
            let obligations_then =
                property_obligations(then, current, no_timeframes)?.conjunction();
            let obligations_else =
                property_obligations(else_, current, no_timeframes)?.conjunction();
            Ok(Obligations::single(
                obligations_then.0.max(obligations_else.0),
                Expr::ite(cond, obligations_then.1, obligations_else.1),
            ))
        }

        Expr::UnaryOp(UOp::Not, op) => {
            // we need NNF, try to eliminate the negation
            if let Some(op_negated) = negate_property_node(op) {
                property_obligations(&op_negated, current, no_timeframes)
            } else if let Expr::SvaSequence { strength, sequence } = op.as_ref() {
                let matches = instantiate_sequence(
                    sequence,
                    Semantics::of(*strength),
                    current,
                    no_timeframes,
                )?;

                let mut obligations = Obligations::new();
                for m in matches {
                    // the sequence must not match
                    if !m.empty_match() {
                        obligations.add(m.end_time, Expr::negate(m.condition));
                    }
                }
                Ok(obligations)
            } else if is_temporal_operator(op) {
                Err(CompileError::NnfFailure((**op).clone()))
            } else {
                // state formula
                Ok(Obligations::single(
                    current,
                    instantiate_property(property, current, no_timeframes),
                ))
            }
        }

        Expr::SvaImplication {
            overlapped,
            sequence,
            property: rhs,
        } => {
            // The LHS is a sequence, the RHS is a property. The
            // implication must hold for _all_ (strong) matches of the
            // LHS, i.e. each pair of LHS match and RHS obligation
            // yields an obligation.
            let lhs_match_points =
                instantiate_sequence(sequence, Semantics::Strong, current, no_timeframes)?;

            let mut result = Obligations::new();

            for lhs_match_point in lhs_match_points {
                if lhs_match_point.empty_match() {
                    continue;
                }

                // the RHS of the non-overlapped implication starts one
                // timeframe later
                let t_rhs = if *overlapped {
                    lhs_match_point.end_time
                } else {
                    lhs_match_point.end_time + 1
                };

                // do we exceed the bound? make it 'true'
                if t_rhs >= no_timeframes {
                    return Ok(Obligations::single(no_timeframes - 1, Expr::true_()));
                }

                let rhs_obligations = property_obligations(rhs, t_rhs, no_timeframes)?;

                for (t, es) in rhs_obligations.map {
                    let cond = Expr::implies(
                        lhs_match_point.condition.clone(),
                        Expr::and(es),
                    );
                    result.add(t, cond);
                }
            }

            Ok(result)
        }

        Expr::SvaFollowedBy {
            overlapped,
            sequence,
            property: rhs,
        } => {
            // The LHS is a sequence, the RHS is a property, and the
            // result holds if some match of the LHS is followed by the
            // RHS.
            let matches =
                instantiate_sequence(sequence, Semantics::Strong, current, no_timeframes)?;

            let mut disjuncts = vec![];
            let mut t = current;

            for m in matches {
                if m.empty_match() {
                    continue;
                }

                // #=# advances the clock by one from the match point
                let property_start = if *overlapped {
                    m.end_time
                } else {
                    m.end_time + 1
                };

                if property_start >= no_timeframes {
                    // relies on NNF
                    t = t.max(no_timeframes - 1);
                    disjuncts.push(m.condition);
                } else {
                    let obligations =
                        property_obligations(rhs, property_start, no_timeframes)?
                            .conjunction();
                    disjuncts.push(Expr::and([m.condition, obligations.1]));
                    t = t.max(obligations.0);
                }
            }

            Ok(Obligations::single(t, Expr::or(disjuncts)))
        }

        Expr::SvaSequence { strength, sequence } => {
            // sequence expressions may have multiple potential match
            // points, and evaluate to true if any of them matches
            let matches = instantiate_sequence(
                sequence,
                Semantics::of(*strength),
                current,
                no_timeframes,
            )?;

            let mut disjuncts = vec![];
            let mut max = current;
            for m in matches {
                // empty matches are not considered
                if !m.empty_match() {
                    disjuncts.push(m.condition);
                    max = max.max(m.end_time);
                }
            }
            Ok(Obligations::single(max, Expr::or(disjuncts)))
        }

        _ => {
            if has_temporal_operator(property) {
                // anything temporal that reaches this point is outside
                // the supported fragment
                Err(CompileError::Unsupported)
            } else {
                // a state predicate
                Ok(Obligations::single(
                    current,
                    instantiate_property(property, current, no_timeframes),
                ))
            }
        }
    }
}

/// Compile `property` over a whole unwinding and map the obligations
/// onto per-frame solver handles. Slot `t` of the result is true exactly
/// when the obligations owed at frame `t` hold; frames owing nothing get
/// a constant true.
pub fn property_handles<S: DecisionProcedure + ?Sized>(
    property: &Expr,
    no_timeframes: usize,
    solver: &mut S,
) -> Result<Vec<Expr>, CompileError> {
    let obligations = property_obligations(property, 0, no_timeframes)?;

    let mut handles = vec![Expr::true_(); no_timeframes];
    for (t, es) in obligations.map {
        assert!(t < no_timeframes, "obligation must have a valid timeframe");
        handles[t] = solver.handle(&Expr::and(es));
    }
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::nnf::normalize;
    use rtl::parser::term;

    fn obligations(src: &str, current: usize, no_timeframes: usize) -> Obligations {
        property_obligations(&normalize(&term(src)), current, no_timeframes).unwrap()
    }

    #[test]
    fn test_keys_stay_within_the_unwinding() {
        for (src, current, no_timeframes) in [
            ("G r", 1, 4),
            ("G (r -> X q)", 0, 3),
            ("always [1:2] r", 0, 5),
            ("r W q", 2, 4),
            ("always (r |-> ##1 q)", 0, 4),
        ] {
            let o = obligations(src, current, no_timeframes);
            for &k in o.map.keys() {
                assert!(current <= k && k < no_timeframes, "{src}: key {k}");
            }
        }
    }

    #[test]
    fn test_always_unions_over_frames() {
        let whole = obligations("G r", 0, 3);
        let mut unioned = Obligations::new();
        for c in 0..3 {
            unioned.merge(obligations("r", c, 3));
        }
        assert_eq!(whole, unioned);
    }

    #[test]
    fn test_and_is_union() {
        let whole = obligations("G r & G q", 0, 3);
        let mut unioned = obligations("G r", 0, 3);
        unioned.merge(obligations("G q", 0, 3));
        assert_eq!(whole, unioned);
    }

    #[test]
    fn test_implies_is_or_of_negation() {
        assert_eq!(
            obligations("r -> q", 0, 2),
            obligations("!r | q", 0, 2),
        );
    }

    #[test]
    fn test_next_at_the_last_frame_is_trivial() {
        let o = obligations("X r", 1, 2);
        assert_eq!(o, Obligations::single(1, Expr::true_()));
    }

    #[test]
    fn test_eventually_with_zero_window_is_now() {
        let window = obligations("eventually [0:0] r", 1, 3);
        let now = obligations("r", 1, 3);
        assert_eq!(window.conjunction().1, now.conjunction().1);
    }

    #[test]
    fn test_liveness_with_one_frame_has_no_lasso_candidates() {
        assert!(obligations("F r", 0, 1).is_empty());
    }

    #[test]
    fn test_liveness_emits_lasso_disjunctions() {
        let o = obligations("F r", 0, 3);
        // candidate loopbacks: (0,1), (0,2), (1,2)
        assert_eq!(o.map[&1].len(), 1);
        assert_eq!(o.map[&2].len(), 2);
        let phi = Expr::or([Expr::id("r@0"), Expr::id("r@1"), Expr::id("r@2")]);
        assert_eq!(
            o.map[&1][0],
            Expr::or([
                Expr::negate(rtl::timeframe::lasso_symbol(0, 1)),
                phi,
            ]),
        );
    }

    #[test]
    fn test_strong_release_reuses_the_weak_until_rewrite() {
        // this mirrors the original rewrite; see the design notes
        assert_eq!(
            obligations("p M q", 0, 3),
            obligations("F q & (p W q)", 0, 3),
        );
    }

    #[test]
    fn test_until_with_flips_operands() {
        assert_eq!(
            obligations("p until_with q", 0, 3),
            obligations("q R p", 0, 3),
        );
    }

    #[test]
    fn test_weak_until_at_the_last_frame_drops_the_next_step() {
        let o = obligations("p W q", 1, 2);
        assert_eq!(
            o,
            Obligations::single(1, Expr::or([Expr::id("q@1"), Expr::id("p@1")])),
        );
    }

    #[test]
    fn test_negated_sequence_forbids_each_match() {
        let o = property_obligations(&term("!(weak(r ##1 q))"), 0, 3).unwrap();
        assert_eq!(
            o,
            Obligations::single(
                1,
                Expr::negate(Expr::and([Expr::id("r@0"), Expr::id("q@1")])),
            ),
        );
    }

    #[test]
    fn test_implication_beyond_the_bound_is_trivially_true() {
        // the consequent of the non-overlapped implication would start
        // at frame 2
        let o = obligations("r ##1 q |=> p", 0, 2);
        assert_eq!(o, Obligations::single(1, Expr::true_()));
    }

    #[test]
    fn test_implication_guards_consequent_with_match_condition() {
        let o = obligations("r |-> q", 0, 2);
        assert_eq!(
            o,
            Obligations::single(0, Expr::implies(Expr::id("r@0"), Expr::id("q@0"))),
        );
    }

    #[test]
    fn test_unsupported_negation_fails_nnf() {
        assert_eq!(
            property_obligations(&term("!(p until q)"), 0, 2),
            Err(CompileError::NnfFailure(term("p until q"))),
        );
    }

    #[test]
    fn test_unbounded_ranges_are_rejected() {
        assert_eq!(
            property_obligations(&term("s_eventually [0:$] r"), 0, 2),
            Err(CompileError::UnboundedRange),
        );
    }

    #[test]
    fn test_unsupported_sequences_surface_as_unsupported() {
        assert_eq!(
            property_obligations(&term("weak(r[*])"), 0, 2),
            Err(CompileError::Unsupported),
        );
    }

    #[test]
    fn test_ctl_outside_the_common_fragment_is_unsupported() {
        assert!(!supports_property(&term("EF r")));
        assert!(!supports_property(&term("E[r U q]")));
        assert!(supports_property(&term("AG (r & AX q)")));
        assert!(supports_property(&term("G (r -> X q)")));
        assert!(supports_property(&term("always (r |-> ##1 q)")));
    }

    #[test]
    fn test_requires_lasso_constraints() {
        assert!(requires_lasso_constraints(&term("G (F r)")));
        assert!(requires_lasso_constraints(&term("AF r")));
        assert!(!requires_lasso_constraints(&term("G r")));
    }
}
