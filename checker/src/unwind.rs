// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Unwinding a transition system into a solver.

use rtl::syntax::Expr;
use rtl::timeframe::{instantiate, lasso_symbol, timeframe_symbol};
use rtl::transitions::TransitionSystem;
use solver::DecisionProcedure;

/// Assert the transition relation between every consecutive pair of the
/// `no_timeframes` frame copies, and the initial-state predicate at
/// frame 0 unless `with_initial` is false (the inductive step runs
/// without it).
pub fn unwind<S: DecisionProcedure + ?Sized>(
    system: &TransitionSystem,
    solver: &mut S,
    no_timeframes: usize,
    with_initial: bool,
) {
    if no_timeframes == 0 {
        return;
    }

    if with_initial {
        solver.set_to_true(&instantiate(&system.init, 0, no_timeframes));
    }

    for c in 0..no_timeframes - 1 {
        solver.set_to_true(&instantiate(&system.trans, c, no_timeframes));
    }
}

/// Define the lasso symbols for an unwinding of `no_timeframes` frames:
/// `lasso(l, k)` holds exactly when the registers at frame `k+1` agree
/// with the registers at frame `l`. Frame `no_timeframes` is materialized
/// as one extra transition step so that the successor of the last frame
/// is constrained.
pub fn lasso_constraints<S: DecisionProcedure + ?Sized>(
    system: &TransitionSystem,
    solver: &mut S,
    no_timeframes: usize,
) {
    if no_timeframes < 2 {
        return; // no loopback candidates
    }

    // the extra frame
    solver.set_to_true(&instantiate(
        &system.trans,
        no_timeframes - 1,
        no_timeframes + 1,
    ));

    for k in 1..no_timeframes {
        for l in 0..k {
            let state_equality = Expr::and(system.signature.registers().map(|decl| {
                Expr::iff(
                    Expr::Id(timeframe_symbol(&decl.name, k + 1)),
                    Expr::Id(timeframe_symbol(&decl.name, l)),
                )
            }));
            solver.set_to_true(&Expr::iff(lasso_symbol(l, k), state_equality));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::parser::parse;
    use rtl::transitions::extract;
    use solver::backends::CadicalBackend;
    use solver::DecisionResult;

    fn toggle() -> TransitionSystem {
        let module = parse("register r\n\ninit !r\ntrans r' <-> !r\n").unwrap();
        extract(&module).unwrap().0
    }

    #[test]
    fn test_unwind_constrains_frames() {
        let system = toggle();
        let mut solver = CadicalBackend::new();
        unwind(&system, &mut solver, 3, true);
        // r toggles 0, 1, 0
        solver.set_to_true(&Expr::id("r@1"));
        solver.set_to_false(&Expr::id("r@2"));
        assert_eq!(solver.dec_proc(), DecisionResult::Satisfiable);

        let mut solver = CadicalBackend::new();
        unwind(&system, &mut solver, 3, true);
        solver.set_to_true(&Expr::id("r@2"));
        assert_eq!(solver.dec_proc(), DecisionResult::Unsatisfiable);
    }

    #[test]
    fn test_unwind_without_initial_state() {
        let system = toggle();
        let mut solver = CadicalBackend::new();
        unwind(&system, &mut solver, 2, false);
        // without init, the trace may start high
        solver.set_to_true(&Expr::id("r@0"));
        assert_eq!(solver.dec_proc(), DecisionResult::Satisfiable);
    }

    #[test]
    fn test_lasso_symbols_capture_loops() {
        let system = toggle();
        let mut solver = CadicalBackend::new();
        unwind(&system, &mut solver, 2, true);
        lasso_constraints(&system, &mut solver, 2);
        // r@0 = 0, r@1 = 1, r@2 = 0: the successor of frame 1 loops
        // back to frame 0
        solver.set_to_true(&lasso_symbol(0, 1));
        assert_eq!(solver.dec_proc(), DecisionResult::Satisfiable);
    }
}
