// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Tseitin transformation from state formulas to propositional CNF.

use rtl::syntax::{BinOp, Expr, NOp, UOp};
use std::collections::HashMap;

/// A propositional literal, composed of an index and whether it is positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    var: usize,
    pos: bool,
}

/// A propositional clause.
pub type Clause = Vec<Literal>;
/// A propositional CNF.
pub type Cnf = Vec<Clause>;

impl Literal {
    /// A positive literal.
    pub fn t(var: usize) -> Literal {
        Literal { var, pos: true }
    }
    /// A negative literal.
    pub fn f(var: usize) -> Literal {
        Literal { var, pos: false }
    }
    /// Convert this literal to a CaDiCaL literal represented as a signed integer.
    pub fn as_int(&self) -> i32 {
        (self.var as i32 + 1) * if self.pos { 1 } else { -1 }
    }
}

/// Allocation of propositional variables: named variables for the atoms
/// of the formula, anonymous ones for the Tseitin definitions.
#[derive(Debug, Default)]
pub struct VarMap {
    atoms: HashMap<String, usize>,
    next: usize,
}

impl VarMap {
    /// An empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh anonymous variable.
    pub fn var(&mut self) -> usize {
        let v = self.next;
        self.next += 1;
        v
    }

    /// The variable of the atom `name`, allocating it on first use.
    pub fn atom(&mut self, name: &str) -> usize {
        if let Some(&v) = self.atoms.get(name) {
            return v;
        }
        let v = self.var();
        self.atoms.insert(name.to_string(), v);
        v
    }

    /// The variable of the atom `name`, if it has been allocated.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.atoms.get(name).copied()
    }

    /// Bind `name` to an existing variable. Used for solver handles.
    pub fn bind(&mut self, name: &str, var: usize) {
        self.atoms.insert(name.to_string(), var);
    }
}

/// Perform the Tseitin transformation on the given state formula,
/// appending the definitional clauses to `out` and returning the
/// variable equisatisfiable with the formula.
pub fn tseitin(e: &Expr, vars: &mut VarMap, out: &mut Cnf) -> usize {
    match e {
        Expr::Literal(b) => {
            let new = vars.var();
            out.push(vec![if *b { Literal::t(new) } else { Literal::f(new) }]);
            new
        }
        Expr::Id(name) => vars.atom(name),
        Expr::UnaryOp(UOp::Not, op) => {
            let old = tseitin(op, vars, out);
            let new = vars.var();
            out.push(vec![Literal::t(old), Literal::t(new)]);
            out.push(vec![Literal::f(old), Literal::f(new)]);
            new
        }
        Expr::NAryOp(NOp::And, es) => {
            let olds: Vec<_> = es.iter().map(|e| tseitin(e, vars, out)).collect();
            let new = vars.var();
            for old in &olds {
                out.push(vec![Literal::t(*old), Literal::f(new)]);
            }
            let mut clause: Vec<_> = olds.into_iter().map(Literal::f).collect();
            clause.push(Literal::t(new));
            out.push(clause);
            new
        }
        Expr::NAryOp(NOp::Or, es) => {
            let olds: Vec<_> = es.iter().map(|e| tseitin(e, vars, out)).collect();
            let new = vars.var();
            for old in &olds {
                out.push(vec![Literal::f(*old), Literal::t(new)]);
            }
            let mut clause: Vec<_> = olds.into_iter().map(Literal::t).collect();
            clause.push(Literal::f(new));
            out.push(clause);
            new
        }
        Expr::BinOp(BinOp::Equals | BinOp::Iff, lhs, rhs) => {
            let a = tseitin(lhs, vars, out);
            let b = tseitin(rhs, vars, out);
            let c = vars.var();
            out.push(vec![Literal::f(a), Literal::f(b), Literal::t(c)]);
            out.push(vec![Literal::f(a), Literal::t(b), Literal::f(c)]);
            out.push(vec![Literal::t(a), Literal::f(b), Literal::f(c)]);
            out.push(vec![Literal::t(a), Literal::t(b), Literal::t(c)]);
            c
        }
        Expr::BinOp(BinOp::NotEquals, lhs, rhs) => {
            let a = tseitin(lhs, vars, out);
            let b = tseitin(rhs, vars, out);
            let c = vars.var();
            out.push(vec![Literal::f(a), Literal::f(b), Literal::f(c)]);
            out.push(vec![Literal::f(a), Literal::t(b), Literal::t(c)]);
            out.push(vec![Literal::t(a), Literal::f(b), Literal::t(c)]);
            out.push(vec![Literal::t(a), Literal::t(b), Literal::f(c)]);
            c
        }
        Expr::BinOp(BinOp::Implies, lhs, rhs) => {
            let a = tseitin(lhs, vars, out);
            let b = tseitin(rhs, vars, out);
            let c = vars.var();
            out.push(vec![Literal::f(c), Literal::f(a), Literal::t(b)]);
            out.push(vec![Literal::t(c), Literal::t(a)]);
            out.push(vec![Literal::t(c), Literal::f(b)]);
            c
        }
        Expr::Ite { cond, then, else_ } => {
            let c = tseitin(cond, vars, out);
            let t = tseitin(then, vars, out);
            let e = tseitin(else_, vars, out);
            let new = vars.var();
            out.push(vec![Literal::f(new), Literal::f(c), Literal::t(t)]);
            out.push(vec![Literal::f(new), Literal::t(c), Literal::t(e)]);
            out.push(vec![Literal::t(new), Literal::f(c), Literal::f(t)]);
            out.push(vec![Literal::t(new), Literal::t(c), Literal::f(e)]);
            new
        }
        _ => panic!("cannot encode non-state formula: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::parser::term;

    #[test]
    fn test_tseitin_shapes() {
        let mut vars = VarMap::new();
        let mut cnf = vec![];
        let root = tseitin(&term("a & !b"), &mut vars, &mut cnf);
        // two atoms, one negation aux, one conjunction aux
        assert_eq!(root, 3);
        assert_eq!(vars.lookup("a"), Some(0));
        assert_eq!(vars.lookup("b"), Some(1));
        // negation contributes 2 clauses, conjunction 3
        assert_eq!(cnf.len(), 5);
    }

    #[test]
    fn test_literal_as_int() {
        assert_eq!(Literal::t(0).as_int(), 1);
        assert_eq!(Literal::f(0).as_int(), -1);
        assert_eq!(Literal::t(4).as_int(), 5);
    }
}
