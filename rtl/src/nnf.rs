// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Rewriting properties towards negation normal form.

use crate::syntax::*;

fn not(e: Expr) -> Expr {
    Expr::negate(e)
}

/// Given `e`, return an expr equivalent to `!e` with the negation pushed
/// one level down, or `None` if `e` has no dual form. Sequence operators
/// have no dual; negated sequences are handled by the obligation
/// compiler directly.
pub fn negate_property_node(e: &Expr) -> Option<Expr> {
    match e {
        Expr::Literal(b) => Some(Expr::Literal(!b)),
        Expr::UnaryOp(UOp::Not, op) => Some((**op).clone()),
        Expr::NAryOp(NOp::And, es) => {
            Some(Expr::NAryOp(NOp::Or, es.iter().cloned().map(not).collect()))
        }
        Expr::NAryOp(NOp::Or, es) => Some(Expr::NAryOp(
            NOp::And,
            es.iter().cloned().map(not).collect(),
        )),
        Expr::BinOp(BinOp::Implies | BinOp::SvaImplies, lhs, rhs) => Some(Expr::and([
            (**lhs).clone(),
            not((**rhs).clone()),
        ])),
        // !(a <-> b) is (a & !b) | (!a & b)
        Expr::BinOp(BinOp::Equals | BinOp::Iff | BinOp::SvaIff, lhs, rhs) => {
            let (a, b) = ((**lhs).clone(), (**rhs).clone());
            Some(Expr::or([
                Expr::and([a.clone(), not(b.clone())]),
                Expr::and([not(a), b]),
            ]))
        }
        Expr::BinOp(BinOp::NotEquals, lhs, rhs) => {
            Some(Expr::BinOp(BinOp::Equals, lhs.clone(), rhs.clone()))
        }
        Expr::Ite { cond, then, else_ } => Some(Expr::Ite {
            cond: cond.clone(),
            then: Box::new(not((**then).clone())),
            else_: Box::new(not((**else_).clone())),
        }),

        // linear-time duals
        Expr::UnaryOp(UOp::Next, op) => Some(Expr::next(not((**op).clone()))),
        Expr::UnaryOp(UOp::Eventually, op) => Some(Expr::always(not((**op).clone()))),
        Expr::UnaryOp(UOp::Always, op) => Some(Expr::eventually(not((**op).clone()))),
        Expr::BinOp(BinOp::Until, lhs, rhs) => Some(Expr::BinOp(
            BinOp::Release,
            Box::new(not((**lhs).clone())),
            Box::new(not((**rhs).clone())),
        )),
        Expr::BinOp(BinOp::Release, lhs, rhs) => Some(Expr::BinOp(
            BinOp::Until,
            Box::new(not((**lhs).clone())),
            Box::new(not((**rhs).clone())),
        )),
        Expr::BinOp(BinOp::WeakUntil, lhs, rhs) => Some(Expr::BinOp(
            BinOp::StrongRelease,
            Box::new(not((**lhs).clone())),
            Box::new(not((**rhs).clone())),
        )),
        Expr::BinOp(BinOp::StrongRelease, lhs, rhs) => Some(Expr::BinOp(
            BinOp::WeakUntil,
            Box::new(not((**lhs).clone())),
            Box::new(not((**rhs).clone())),
        )),

        // CTL duals
        Expr::UnaryOp(UOp::AX, op) => Some(Expr::UnaryOp(UOp::EX, Box::new(not((**op).clone())))),
        Expr::UnaryOp(UOp::EX, op) => Some(Expr::UnaryOp(UOp::AX, Box::new(not((**op).clone())))),
        Expr::UnaryOp(UOp::AF, op) => Some(Expr::UnaryOp(UOp::EG, Box::new(not((**op).clone())))),
        Expr::UnaryOp(UOp::EG, op) => Some(Expr::UnaryOp(UOp::AF, Box::new(not((**op).clone())))),
        Expr::UnaryOp(UOp::AG, op) => Some(Expr::UnaryOp(UOp::EF, Box::new(not((**op).clone())))),
        Expr::UnaryOp(UOp::EF, op) => Some(Expr::UnaryOp(UOp::AG, Box::new(not((**op).clone())))),

        // SVA duals swap weak and strong
        Expr::UnaryOp(UOp::SvaAlways, op) => Some(Expr::UnaryOp(
            UOp::SvaSEventually,
            Box::new(not((**op).clone())),
        )),
        Expr::UnaryOp(UOp::SvaSEventually, op) => Some(Expr::UnaryOp(
            UOp::SvaAlways,
            Box::new(not((**op).clone())),
        )),
        Expr::UnaryOp(UOp::SvaNexttime, op) => Some(Expr::UnaryOp(
            UOp::SvaSNexttime,
            Box::new(not((**op).clone())),
        )),
        Expr::UnaryOp(UOp::SvaSNexttime, op) => Some(Expr::UnaryOp(
            UOp::SvaNexttime,
            Box::new(not((**op).clone())),
        )),
        Expr::SvaEventually { range, op } => Some(Expr::SvaRangedAlways {
            strong: true,
            range: *range,
            op: Box::new(not((**op).clone())),
        }),
        Expr::SvaRangedSEventually { range, op } => Some(Expr::SvaRangedAlways {
            strong: false,
            range: *range,
            op: Box::new(not((**op).clone())),
        }),
        Expr::SvaRangedAlways {
            strong: true,
            range,
            op,
        } => Some(Expr::SvaEventually {
            range: *range,
            op: Box::new(not((**op).clone())),
        }),
        Expr::SvaRangedAlways {
            strong: false,
            range,
            op,
        } => Some(Expr::SvaRangedSEventually {
            range: *range,
            op: Box::new(not((**op).clone())),
        }),

        // implication and followed-by are duals of each other
        Expr::SvaImplication {
            overlapped,
            sequence,
            property,
        } => Some(Expr::SvaFollowedBy {
            overlapped: *overlapped,
            sequence: sequence.clone(),
            property: Box::new(not((**property).clone())),
        }),
        Expr::SvaFollowedBy {
            overlapped,
            sequence,
            property,
        } => Some(Expr::SvaImplication {
            overlapped: *overlapped,
            sequence: sequence.clone(),
            property: Box::new(not((**property).clone())),
        }),

        _ => None,
    }
}

/// Push negations down as far as the duals allow. Negations of atoms
/// stay; so do negations of operators with no dual, which the obligation
/// compiler either handles directly (sequences) or rejects.
pub fn normalize(e: &Expr) -> Expr {
    match e {
        Expr::UnaryOp(UOp::Not, op) => match negate_property_node(op) {
            Some(dual) => normalize(&dual),
            None => Expr::negate(normalize(op)),
        },
        Expr::Literal(_) | Expr::Id(_) => e.clone(),
        Expr::UnaryOp(op, arg) => Expr::UnaryOp(*op, Box::new(normalize(arg))),
        Expr::BinOp(op, lhs, rhs) => {
            Expr::BinOp(*op, Box::new(normalize(lhs)), Box::new(normalize(rhs)))
        }
        Expr::NAryOp(op, es) => Expr::NAryOp(*op, es.iter().map(normalize).collect()),
        Expr::Ite { cond, then, else_ } => Expr::Ite {
            cond: Box::new(normalize(cond)),
            then: Box::new(normalize(then)),
            else_: Box::new(normalize(else_)),
        },
        Expr::SvaEventually { range, op } => Expr::SvaEventually {
            range: *range,
            op: Box::new(normalize(op)),
        },
        Expr::SvaRangedSEventually { range, op } => Expr::SvaRangedSEventually {
            range: *range,
            op: Box::new(normalize(op)),
        },
        Expr::SvaRangedAlways { strong, range, op } => Expr::SvaRangedAlways {
            strong: *strong,
            range: *range,
            op: Box::new(normalize(op)),
        },
        Expr::SvaSequence { strength, sequence } => Expr::SvaSequence {
            strength: *strength,
            sequence: sequence.clone(),
        },
        Expr::SvaImplication {
            overlapped,
            sequence,
            property,
        } => Expr::SvaImplication {
            overlapped: *overlapped,
            sequence: sequence.clone(),
            property: Box::new(normalize(property)),
        },
        Expr::SvaFollowedBy {
            overlapped,
            sequence,
            property,
        } => Expr::SvaFollowedBy {
            overlapped: *overlapped,
            sequence: sequence.clone(),
            property: Box::new(normalize(property)),
        },
        // sequence expressions keep their shape; their cycle conditions
        // are state predicates and gain nothing from normalization
        Expr::SvaBoolean(_)
        | Expr::SeqConcat(_, _)
        | Expr::SeqRepeat { .. }
        | Expr::SeqDelay { .. }
        | Expr::SeqAnd(_, _)
        | Expr::SeqOr(_) => e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::term;

    #[test]
    fn test_normalize_pushes_negations() {
        assert_eq!(normalize(&term("!(G r)")), term("F !r"));
        assert_eq!(normalize(&term("!(r & q)")), term("!r | !q"));
        assert_eq!(normalize(&term("!(r -> q)")), term("r & !q"));
        assert_eq!(normalize(&term("!!r")), term("r"));
        assert_eq!(normalize(&term("!(AG r)")), term("EF !r"));
        assert_eq!(normalize(&term("!(always r)")), term("s_eventually !r"));
        assert_eq!(
            normalize(&term("!(r U q)")),
            term("!r R !q"),
        );
    }

    #[test]
    fn test_normalize_swaps_sva_strength() {
        assert_eq!(
            normalize(&term("!(always [2:3] r)")),
            term("s_eventually [2:3] !r"),
        );
        assert_eq!(
            normalize(&term("!(eventually [0:2] r)")),
            term("s_always [0:2] !r"),
        );
    }

    #[test]
    fn test_normalize_implication_followed_by_duality() {
        // the consequent is negated; the negation stays on the sequence,
        // which has no dual of its own
        assert_eq!(
            normalize(&term("!(r ##1 q |-> ##1 q)")),
            term("r ##1 q #-# !(##1 q)"),
        );
    }

    #[test]
    fn test_normalize_keeps_negated_atoms() {
        assert_eq!(normalize(&term("!r")), term("!r"));
        assert_eq!(normalize(&term("G !r")), term("G !r"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for src in ["!(G (r -> X q))", "!(r U (q & !p))", "!(always (r |-> ##1 q))"] {
            let once = normalize(&term(src));
            assert_eq!(once, normalize(&once));
        }
    }
}
