// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! k-induction: a bounded base case from the initial states, and an
//! inductive step over `k+1` frames without them.

use crate::bmc::bmc;
use crate::properties::{Properties, Property};
use crate::unwind::unwind;
use crate::CheckError;
use rtl::syntax::{Expr, UOp};
use rtl::temporal::{has_past_operator, has_temporal_operator};
use rtl::timeframe::instantiate;
use rtl::transitions::TransitionSystem;
use solver::{DecisionProcedure, DecisionResult};

/// Whether k-induction can work on this property: it must be an
/// invariant, `AG φ` or equivalent, with a non-temporal body.
fn supported(p: &Property) -> bool {
    match &p.normalized {
        Expr::UnaryOp(UOp::AG | UOp::Always | UOp::SvaAlways, op) => !has_temporal_operator(op),
        _ => false,
    }
}

fn body(p: &Property) -> Expr {
    match &p.normalized {
        Expr::UnaryOp(UOp::AG | UOp::Always | UOp::SvaAlways, op) => (**op).clone(),
        _ => unreachable!("property must be an invariant"),
    }
}

/// Run k-induction over the property set and return the updated copy.
///
/// Properties outside the supported fragment are reported unsupported.
/// A property refuted by the base case stays refuted, unless some
/// assumption was unsupported, in which case the refutation may have
/// relied on dropping it and is weakened to inconclusive.
pub fn k_induction<S, F>(
    k: usize,
    system: &TransitionSystem,
    properties: &Properties,
    solver_factory: &F,
) -> Result<Properties, CheckError>
where
    S: DecisionProcedure,
    F: Fn() -> S,
{
    let mut properties = properties.clone();

    if properties.properties.is_empty() {
        return Err(CheckError::NoProperties);
    }

    // fail early if there is nothing to do
    if !properties.properties.iter().any(supported) {
        return Err(CheckError::NoSupportedProperty);
    }

    KInduction {
        k,
        system,
        properties: &mut properties,
        solver_factory,
    }
    .run::<S>()?;

    Ok(properties)
}

struct KInduction<'a, F> {
    k: usize,
    system: &'a TransitionSystem,
    properties: &'a mut Properties,
    solver_factory: &'a F,
}

impl<F> KInduction<'_, F> {
    fn run<S>(mut self) -> Result<(), CheckError>
    where
        S: DecisionProcedure,
        F: Fn() -> S,
    {
        // past references must have been eliminated upstream
        assert!(
            !has_past_operator(&self.system.init)
                && !has_past_operator(&self.system.trans)
                && !self
                    .properties
                    .properties
                    .iter()
                    .any(|p| has_past_operator(&p.expr)),
            "$past must be eliminated before k-induction",
        );

        // an unsupported assumption taints every refutation below
        let mut assumption_unsupported = false;
        for p in &mut self.properties.properties {
            if !supported(p) && p.is_assumed() {
                assumption_unsupported = true;
                p.unsupported("unsupported by k-induction");
            }
        }

        // fail unsupported properties that are not proved yet
        for p in &mut self.properties.properties {
            if !supported(p) && !p.is_assumed() && !p.is_disabled() && !p.is_proved() {
                p.unsupported("unsupported by k-induction");
            }
        }

        log::info!("induction base");
        bmc(self.k, self.system, self.properties, self.solver_factory)?;

        log::info!("induction step");
        self.step::<S>()?;

        // Any refuted properties are really inconclusive if there are
        // unsupported assumptions, as the assumption might have proven
        // the property.
        if assumption_unsupported {
            for p in &mut self.properties.properties {
                if p.is_refuted() {
                    p.inconclusive();
                }
            }
        }

        Ok(())
    }

    fn step<S>(&mut self) -> Result<(), CheckError>
    where
        S: DecisionProcedure,
        F: Fn() -> S,
    {
        let no_timeframes = self.k + 1;

        let assumptions: Vec<Expr> = self
            .properties
            .properties
            .iter()
            .filter(|p| p.is_assumed())
            .map(body)
            .collect();

        for i in 0..self.properties.properties.len() {
            let p = {
                let p = &self.properties.properties[i];
                if p.is_disabled()
                    || p.is_failure()
                    || p.is_assumed()
                    || p.is_unsupported()
                    || p.is_proved()
                {
                    continue;
                }

                // if it is not failed, then it is supported
                debug_assert!(supported(p), "property must be supported");

                // Do not run the step case for properties that have
                // failed the base case already. Properties may pass the
                // step case, but are still false when the base case
                // fails.
                if p.is_refuted() {
                    continue;
                }

                body(p)
            };

            let mut solver = (self.solver_factory)();

            // *no* initial state
            unwind(self.system, &mut solver, no_timeframes, false);

            // add all assumptions for all time frames
            for a in &assumptions {
                for c in 0..no_timeframes {
                    solver.set_to_true(&instantiate(a, c, no_timeframes));
                }
            }

            // assumption: time frames 0,...,k-1
            for c in 0..no_timeframes - 1 {
                solver.set_to_true(&instantiate(&p, c, no_timeframes - 1));
            }

            // property: time frame k
            solver.set_to_false(&instantiate(&p, no_timeframes - 1, no_timeframes));

            match solver.dec_proc() {
                DecisionResult::Satisfiable => {
                    log::info!("SAT: inductive proof failed, k-induction is inconclusive");
                    self.properties.properties[i].inconclusive();
                }
                DecisionResult::Unsatisfiable => {
                    log::info!("UNSAT: inductive proof successful, property holds");
                    self.properties.properties[i]
                        .proved(format!("{}-induction", no_timeframes - 1));
                }
                DecisionResult::Error => return Err(CheckError::SolverError),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Status;
    use rtl::parser::parse;
    use rtl::transitions::extract;
    use solver::backends::CadicalBackend;

    fn run(source: &str, k: usize) -> Properties {
        let module = parse(source).unwrap();
        let (system, decls) = extract(&module).unwrap();
        let properties = Properties::from_decls(&decls);
        k_induction(k, &system, &properties, &CadicalBackend::new).unwrap()
    }

    #[test]
    fn test_pure_safety_is_proved() {
        // a stable register stays low
        let properties = run("register r\n\ninit !r\ntrans r' <-> r\n\nassert AG !r\n", 2);
        assert_eq!(
            properties.properties[0].status,
            Status::Proved("2-induction".to_string()),
        );
    }

    #[test]
    fn test_base_case_violation_is_refuted() {
        // the register toggles, so !r fails in the second frame
        let properties = run("register r\n\ninit !r\ntrans r' <-> !r\n\nassert AG !r\n", 3);
        assert_eq!(
            properties.properties[0].status,
            Status::Refuted { trace_length: 2 },
        );
    }

    #[test]
    fn test_modulo_counter_is_one_inductive() {
        // a two-bit counter modulo 4 in a three-bit register file: the
        // top bit starts low and never rises
        let source = "
register c0
register c1
register c2

init !c0 & !c1 & !c2
trans c0' <-> !c0
trans c1' <-> (c1 != c0)
trans c2' <-> c2

assert safe: AG !c2
";
        let properties = run(source, 1);
        assert_eq!(
            properties.properties[0].status,
            Status::Proved("1-induction".to_string()),
        );
    }

    #[test]
    fn test_one_bit_state_is_one_inductive() {
        // r' = r | inp is not stuck at 0, but "r or not r" style
        // tautologies over one bit close at once
        let source = "
register r
input inp

init !r
trans r' <-> (r | inp)

assert AG (r | !r)
";
        let properties = run(source, 1);
        assert_eq!(
            properties.properties[0].status,
            Status::Proved("1-induction".to_string()),
        );
    }

    #[test]
    fn test_pure_liveness_is_unsupported() {
        let source = "
register r

init !r
trans r' <-> r

assert live: F r
assert safe: AG !r
";
        let properties = run(source, 2);
        assert_eq!(
            properties.find("live").unwrap().status,
            Status::Unsupported("unsupported by k-induction".to_string()),
        );
        assert!(properties.find("safe").unwrap().is_proved());
    }

    #[test]
    fn test_unsupported_assumption_taints_refutation() {
        let source = "
register r
register q

init !r
trans r' <-> !r

assert main: AG !r
assume fair: AG (F q)
";
        let properties = run(source, 3);
        // the base case refutes main, but the dropped assumption might
        // have proven it
        assert_eq!(
            properties.find("main").unwrap().status,
            Status::Inconclusive,
        );
        assert!(properties.find("fair").unwrap().is_unsupported());
    }

    #[test]
    fn test_empty_property_set_is_an_error() {
        let module = parse("register r\n\ninit !r\ntrans r' <-> r\n").unwrap();
        let (system, decls) = extract(&module).unwrap();
        let properties = Properties::from_decls(&decls);
        assert_eq!(
            k_induction(2, &system, &properties, &CadicalBackend::new),
            Err(CheckError::NoProperties),
        );
    }

    #[test]
    fn test_no_supported_property_is_an_error() {
        let module =
            parse("register r\n\ninit !r\ntrans r' <-> r\n\nassert F r\n").unwrap();
        let (system, decls) = extract(&module).unwrap();
        let properties = Properties::from_decls(&decls);
        assert_eq!(
            k_induction(2, &system, &properties, &CadicalBackend::new),
            Err(CheckError::NoSupportedProperty),
        );
    }

    #[test]
    fn test_assumptions_enable_step_proofs() {
        // r' = r | inp only stays low if the input is assumed low
        let source = "
register r
input inp

init !r
trans r' <-> (r | inp)

assume env: AG !inp
assert safe: AG !r
";
        let properties = run(source, 1);
        assert!(properties.find("safe").unwrap().is_proved());
    }

    #[test]
    fn test_k_zero_step_checks_all_states() {
        // with k = 0 there is no base case and the step asserts the
        // negated property on a single unconstrained frame
        let properties = run("register r\n\ninit !r\ntrans r' <-> r\n\nassert AG (r | !r)\n", 0);
        assert_eq!(
            properties.properties[0].status,
            Status::Proved("0-induction".to_string()),
        );
    }
}
