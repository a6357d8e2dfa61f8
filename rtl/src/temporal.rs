// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Classification of operators into the temporal layers.

use crate::syntax::*;

/// Whether the top node of `e` is a temporal operator (linear-time, CTL,
/// SVA property, or SVA sequence). Negation and prime are not temporal.
pub fn is_temporal_operator(e: &Expr) -> bool {
    match e {
        Expr::UnaryOp(op, _) => !matches!(op, UOp::Not | UOp::Prime),
        Expr::BinOp(op, _, _) => matches!(
            op,
            BinOp::Until
                | BinOp::WeakUntil
                | BinOp::Release
                | BinOp::StrongRelease
                | BinOp::EUntil
                | BinOp::SvaUntil
                | BinOp::SvaSUntil
                | BinOp::SvaUntilWith
                | BinOp::SvaSUntilWith
        ),
        Expr::SvaEventually { .. }
        | Expr::SvaRangedSEventually { .. }
        | Expr::SvaRangedAlways { .. }
        | Expr::SvaSequence { .. }
        | Expr::SvaImplication { .. }
        | Expr::SvaFollowedBy { .. } => true,
        e => is_sequence_expr(e),
    }
}

/// Whether the top node of `e` is an SVA sequence expression.
pub fn is_sequence_expr(e: &Expr) -> bool {
    matches!(
        e,
        Expr::SvaBoolean(_)
            | Expr::SeqConcat(_, _)
            | Expr::SeqRepeat { .. }
            | Expr::SeqDelay { .. }
            | Expr::SeqAnd(_, _)
            | Expr::SeqOr(_)
    )
}

/// Whether any node of `e` is a temporal operator.
pub fn has_temporal_operator(e: &Expr) -> bool {
    e.contains(&is_temporal_operator)
}

/// Whether any node of `e` is a `$past`. Past references must be
/// eliminated before checking starts.
pub fn has_past_operator(e: &Expr) -> bool {
    e.contains(&|e| matches!(e, Expr::UnaryOp(UOp::Past, _)))
}

fn is_ctl_operator(e: &Expr) -> bool {
    matches!(
        e,
        Expr::UnaryOp(UOp::AX | UOp::AF | UOp::AG | UOp::EX | UOp::EF | UOp::EG, _)
            | Expr::BinOp(BinOp::EUntil, _, _)
    )
}

fn is_ltl_operator(e: &Expr) -> bool {
    matches!(
        e,
        Expr::UnaryOp(UOp::Next | UOp::Eventually | UOp::Always, _)
            | Expr::BinOp(
                BinOp::Until | BinOp::WeakUntil | BinOp::Release | BinOp::StrongRelease,
                _,
                _,
            )
    )
}

fn is_sva_operator(e: &Expr) -> bool {
    is_temporal_operator(e) && !is_ctl_operator(e) && !is_ltl_operator(e)
}

/// Whether `e` has a CTL operator anywhere.
pub fn has_ctl_operator(e: &Expr) -> bool {
    e.contains(&is_ctl_operator)
}

/// `e` is an LTL property: no CTL or SVA operators anywhere. State
/// predicates count as LTL.
pub fn is_ltl(e: &Expr) -> bool {
    !e.contains(&|e| is_ctl_operator(e) || is_sva_operator(e))
}

/// `e` is a CTL property: at least one CTL operator, and no LTL-only or
/// SVA operators.
pub fn is_ctl(e: &Expr) -> bool {
    has_ctl_operator(e) && !e.contains(&|e| is_ltl_operator(e) || is_sva_operator(e))
}

/// `e` is an SVA property: at least one SVA operator, and no LTL-only or
/// CTL operators.
pub fn is_sva(e: &Expr) -> bool {
    e.contains(&is_sva_operator) && !e.contains(&|e| is_ltl_operator(e) || is_ctl_operator(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::term;

    #[test]
    fn test_classification() {
        assert!(is_ltl(&term("G (r -> X !r)")));
        assert!(!is_ctl(&term("G (r -> X !r)")));

        assert!(is_ctl(&term("AG (r -> AX !r)")));
        assert!(!is_ltl(&term("AG (r -> AX !r)")));

        assert!(is_sva(&term("always (r |-> ##1 !r)")));
        assert!(!is_ltl(&term("always (r |-> ##1 !r)")));

        // state predicates are in the LTL fragment
        assert!(is_ltl(&term("r & !q")));
        assert!(!is_ctl(&term("r & !q")));
        assert!(!is_sva(&term("r & !q")));

        // mixtures belong to no category
        let mixed = term("AG (F r)");
        assert!(!is_ltl(&mixed) && !is_ctl(&mixed) && !is_sva(&mixed));
    }

    #[test]
    fn test_has_temporal_operator() {
        assert!(!has_temporal_operator(&term("r & (q | !r)")));
        assert!(has_temporal_operator(&term("r & X q")));
        assert!(has_temporal_operator(&term("always r")));
    }

    #[test]
    fn test_has_past_operator() {
        assert!(has_past_operator(&term("r = $past(q)")));
        assert!(!has_past_operator(&term("r = q")));
    }
}
