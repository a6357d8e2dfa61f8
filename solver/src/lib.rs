// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The decision-procedure boundary of the checker, and a reference
//! backend on the [CaDiCaL][cadical] SAT solver for the boolean fragment.
//!
//! [cadical]: https://fmv.jku.at/cadical/

// configure clippy
#![allow(clippy::needless_return)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backends;
pub mod cnf;

use rtl::syntax::Expr;

/// The verdict of a decision procedure.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum DecisionResult {
    /// The asserted formulas have a model
    Satisfiable,
    /// The asserted formulas are contradictory
    Unsatisfiable,
    /// The procedure failed
    Error,
}

/// A decision procedure for instantiated (state) formulas. One instance
/// holds one monolithic query: formulas are asserted, then the query is
/// dispatched once, then the model may be inspected.
pub trait DecisionProcedure {
    /// Assert that `e` holds.
    fn set_to_true(&mut self, e: &Expr);

    /// Assert that `e` does not hold.
    fn set_to_false(&mut self, e: &Expr);

    /// Internalize `e` and return an equivalent expr that can be
    /// asserted or evaluated later without re-encoding.
    fn handle(&mut self, e: &Expr) -> Expr;

    /// Dispatch the query.
    fn dec_proc(&mut self) -> DecisionResult;

    /// Evaluate `e` in the model of the last [`Self::dec_proc`] call.
    /// Returns `None` if `e` mentions unknown symbols or the last result
    /// was not [`DecisionResult::Satisfiable`].
    fn get(&self, e: &Expr) -> Option<bool>;
}
