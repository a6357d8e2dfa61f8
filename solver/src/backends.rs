// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A [`DecisionProcedure`] on top of the CaDiCaL SAT solver.

use crate::cnf::{tseitin, Cnf, Literal, VarMap};
use crate::{DecisionProcedure, DecisionResult};
use rtl::syntax::{BinOp, Expr, NOp, UOp};

/// The bundled decision procedure for the boolean fragment: state
/// formulas are Tseitin-encoded and handed to CaDiCaL. Word-level
/// designs need bit-blasting first, which is not this backend's job.
pub struct CadicalBackend {
    solver: cadical::Solver,
    vars: VarMap,
    n_handles: usize,
}

impl CadicalBackend {
    /// A fresh solver holding no assertions.
    pub fn new() -> Self {
        CadicalBackend {
            solver: Default::default(),
            vars: VarMap::new(),
            n_handles: 0,
        }
    }

    fn encode(&mut self, e: &Expr) -> usize {
        let mut cnf: Cnf = vec![];
        let root = tseitin(e, &mut self.vars, &mut cnf);
        for clause in &cnf {
            self.solver.add_clause(clause.iter().map(Literal::as_int));
        }
        root
    }
}

impl Default for CadicalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProcedure for CadicalBackend {
    fn set_to_true(&mut self, e: &Expr) {
        let root = self.encode(e);
        self.solver.add_clause([Literal::t(root).as_int()]);
    }

    fn set_to_false(&mut self, e: &Expr) {
        let root = self.encode(e);
        self.solver.add_clause([Literal::f(root).as_int()]);
    }

    fn handle(&mut self, e: &Expr) -> Expr {
        let root = self.encode(e);
        let name = format!("#h{}", self.n_handles);
        self.n_handles += 1;
        self.vars.bind(&name, root);
        Expr::Id(name)
    }

    fn dec_proc(&mut self) -> DecisionResult {
        let result = match self.solver.solve() {
            Some(true) => DecisionResult::Satisfiable,
            Some(false) => DecisionResult::Unsatisfiable,
            None => DecisionResult::Error,
        };
        log::debug!("cadical returned {result:?}");
        result
    }

    fn get(&self, e: &Expr) -> Option<bool> {
        match e {
            Expr::Literal(b) => Some(*b),
            Expr::Id(name) => {
                let var = self.vars.lookup(name)?;
                // variables the solver never saw have no forced value
                Some(self.solver.value(Literal::t(var).as_int()).unwrap_or(false))
            }
            Expr::UnaryOp(UOp::Not, op) => self.get(op).map(|b| !b),
            Expr::NAryOp(NOp::And, es) => es
                .iter()
                .map(|e| self.get(e))
                .collect::<Option<Vec<_>>>()
                .map(|bs| bs.into_iter().all(|b| b)),
            Expr::NAryOp(NOp::Or, es) => es
                .iter()
                .map(|e| self.get(e))
                .collect::<Option<Vec<_>>>()
                .map(|bs| bs.into_iter().any(|b| b)),
            Expr::BinOp(BinOp::Equals | BinOp::Iff, lhs, rhs) => {
                Some(self.get(lhs)? == self.get(rhs)?)
            }
            Expr::BinOp(BinOp::NotEquals, lhs, rhs) => Some(self.get(lhs)? != self.get(rhs)?),
            Expr::BinOp(BinOp::Implies, lhs, rhs) => Some(!self.get(lhs)? || self.get(rhs)?),
            Expr::Ite { cond, then, else_ } => {
                if self.get(cond)? {
                    self.get(then)
                } else {
                    self.get(else_)
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::parser::term;

    #[test]
    fn test_sat_and_model() {
        let mut solver = CadicalBackend::new();
        solver.set_to_true(&term("a & !b"));
        assert_eq!(solver.dec_proc(), DecisionResult::Satisfiable);
        assert_eq!(solver.get(&term("a")), Some(true));
        assert_eq!(solver.get(&term("b")), Some(false));
        assert_eq!(solver.get(&term("a & b")), Some(false));
    }

    #[test]
    fn test_unsat() {
        let mut solver = CadicalBackend::new();
        solver.set_to_true(&term("a -> b"));
        solver.set_to_true(&term("a"));
        solver.set_to_false(&term("b"));
        assert_eq!(solver.dec_proc(), DecisionResult::Unsatisfiable);
    }

    #[test]
    fn test_handles_internalize() {
        let mut solver = CadicalBackend::new();
        let h = solver.handle(&term("a <-> b"));
        solver.set_to_true(&h);
        solver.set_to_true(&term("a"));
        assert_eq!(solver.dec_proc(), DecisionResult::Satisfiable);
        assert_eq!(solver.get(&term("b")), Some(true));
        assert_eq!(solver.get(&h), Some(true));
    }
}
