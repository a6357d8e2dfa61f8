// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Instantiation of state formulas at timeframes.
//!
//! An unwound transition system has one copy of every symbol per
//! timeframe; the copy of `x` at frame `c` is the symbol `x@c`.

use crate::syntax::*;
use crate::temporal::has_temporal_operator;

/// The name of the frame-`frame` copy of `name`.
pub fn timeframe_symbol(name: &str, frame: usize) -> String {
    format!("{name}@{frame}")
}

/// Instantiate a state formula at frame `current`: every symbol becomes
/// its frame-`current` copy, and every primed symbol its frame-`current+1`
/// copy. Panics on temporal operators; those must have been compiled away.
pub fn instantiate(e: &Expr, current: usize, no_timeframes: usize) -> Expr {
    debug_assert!(current < no_timeframes, "frame {current} out of range");
    match e {
        Expr::Literal(_) => e.clone(),
        Expr::Id(name) => Expr::Id(timeframe_symbol(name, current)),
        Expr::UnaryOp(UOp::Prime, op) => match op.as_ref() {
            Expr::Id(name) => {
                debug_assert!(current + 1 < no_timeframes, "prime beyond last frame");
                Expr::Id(timeframe_symbol(name, current + 1))
            }
            _ => panic!("prime applied to non-symbol {op}"),
        },
        Expr::UnaryOp(UOp::Not, op) => Expr::negate(instantiate(op, current, no_timeframes)),
        Expr::BinOp(op @ (BinOp::Equals | BinOp::NotEquals | BinOp::Implies | BinOp::Iff), lhs, rhs) => {
            Expr::BinOp(
                *op,
                Box::new(instantiate(lhs, current, no_timeframes)),
                Box::new(instantiate(rhs, current, no_timeframes)),
            )
        }
        Expr::NAryOp(op, es) => Expr::NAryOp(
            *op,
            es.iter()
                .map(|e| instantiate(e, current, no_timeframes))
                .collect(),
        ),
        Expr::Ite { cond, then, else_ } => Expr::Ite {
            cond: Box::new(instantiate(cond, current, no_timeframes)),
            then: Box::new(instantiate(then, current, no_timeframes)),
            else_: Box::new(instantiate(else_, current, no_timeframes)),
        },
        _ => panic!("temporal operator in state formula: {e}"),
    }
}

/// Like [`instantiate`], for formulas that must be pure state formulas:
/// no temporal operators and no primes.
pub fn instantiate_property(e: &Expr, current: usize, no_timeframes: usize) -> Expr {
    assert!(
        !has_temporal_operator(e),
        "property must be a state formula at this point: {e}"
    );
    instantiate(e, current, no_timeframes)
}

/// The fresh boolean capturing "the state at frame `k+1` equals the
/// state at frame `l`". Its meaning is asserted by the unwinder when
/// loop detection is requested.
pub fn lasso_symbol(l: usize, k: usize) -> Expr {
    Expr::Id(format!("lasso::{l}::{k}"))
}
