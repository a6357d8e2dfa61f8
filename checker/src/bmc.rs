// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Bounded model checking: unwind `k` frames from the initial states
//! and look for a counterexample to each property.

use crate::properties::{Properties, Status};
use crate::unwind::{lasso_constraints, unwind};
use crate::CheckError;
use obligations::property::{property_handles, property_obligations, requires_lasso_constraints, supports_property};
use obligations::CompileError;
use rtl::syntax::Expr;
use rtl::transitions::TransitionSystem;
use solver::{DecisionProcedure, DecisionResult};

fn structural_error(e: CompileError) -> CheckError {
    match e {
        CompileError::NnfFailure(x) => CheckError::NnfFailure(x),
        CompileError::UnboundedRange => CheckError::UnboundedRange,
        CompileError::IndexOutOfRange => CheckError::IndexOutOfRange,
        CompileError::Unsupported => unreachable!("unsupported shapes become property statuses"),
    }
}

/// Check every open property over `k` frames starting from the initial
/// states. A counterexample refutes the property; silence leaves it
/// open. Assumed properties constrain every query; properties whose
/// shape cannot be compiled are put aside as unsupported.
pub fn bmc<S, F>(
    k: usize,
    system: &TransitionSystem,
    properties: &mut Properties,
    solver_factory: &F,
) -> Result<(), CheckError>
where
    S: DecisionProcedure,
    F: Fn() -> S,
{
    if k == 0 {
        return Ok(());
    }

    // Shapes outside the fragment are put aside before any solving, so
    // that the assumption set below is exactly the usable assumptions.
    for p in &mut properties.properties {
        if !matches!(p.status, Status::Open | Status::Assumed) {
            continue;
        }
        let compiles = supports_property(&p.normalized)
            && !matches!(
                property_obligations(&p.normalized, 0, k),
                Err(CompileError::Unsupported),
            );
        if !compiles {
            p.unsupported("unsupported by bounded model checking");
        }
    }

    let assumptions: Vec<Expr> = properties
        .properties
        .iter()
        .filter(|p| p.is_assumed())
        .map(|p| p.normalized.clone())
        .collect();

    for i in 0..properties.properties.len() {
        let (name, normalized) = {
            let p = &properties.properties[i];
            if p.status != Status::Open {
                continue;
            }
            (p.name.clone(), p.normalized.clone())
        };

        let mut solver = solver_factory();
        unwind(system, &mut solver, k, true);

        if requires_lasso_constraints(&normalized)
            || assumptions.iter().any(requires_lasso_constraints)
        {
            lasso_constraints(system, &mut solver, k);
        }

        for a in &assumptions {
            let handles = property_handles(a, k, &mut solver).map_err(structural_error)?;
            for h in handles {
                solver.set_to_true(&h);
            }
        }

        let handles = match property_handles(&normalized, k, &mut solver) {
            Ok(handles) => handles,
            Err(e) => return Err(structural_error(e)),
        };

        // a counterexample falsifies the property in some frame
        solver.set_to_false(&Expr::and(handles.clone()));

        match solver.dec_proc() {
            DecisionResult::Satisfiable => {
                // the first falsified frame bounds the trace
                let trace_length = handles
                    .iter()
                    .position(|h| solver.get(h) == Some(false))
                    .map(|t| t + 1)
                    .unwrap_or(k);
                log::info!("{name}: counterexample of length {trace_length}");
                properties.properties[i].refuted(trace_length);
            }
            DecisionResult::Unsatisfiable => {
                log::info!("{name}: no counterexample within {k} frames");
            }
            DecisionResult::Error => return Err(CheckError::SolverError),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Status;
    use rtl::parser::parse;
    use rtl::transitions::extract;
    use solver::backends::CadicalBackend;

    fn check(source: &str, k: usize) -> Properties {
        let module = parse(source).unwrap();
        let (system, decls) = extract(&module).unwrap();
        let mut properties = Properties::from_decls(&decls);
        bmc(k, &system, &mut properties, &CadicalBackend::new).unwrap();
        properties
    }

    #[test]
    fn test_bmc_finds_no_counterexample_in_stable_system() {
        let properties = check("register r\n\ninit !r\ntrans r' <-> r\n\nassert G !r\n", 4);
        assert_eq!(properties.properties[0].status, Status::Open);
    }

    #[test]
    fn test_bmc_refutes_with_trace_length() {
        // r toggles, so !r fails in frame 1 with a two-frame trace
        let properties = check("register r\n\ninit !r\ntrans r' <-> !r\n\nassert G !r\n", 3);
        assert_eq!(
            properties.properties[0].status,
            Status::Refuted { trace_length: 2 },
        );
    }

    #[test]
    fn test_bmc_honors_assumptions() {
        let source = "
register r
input inp

init !r
trans r' <-> (r | inp)

assume always !inp
assert G !r
";
        let properties = check(source, 4);
        assert_eq!(properties.properties[1].status, Status::Open);
    }

    #[test]
    fn test_bmc_refutes_liveness_with_a_lasso() {
        // r stays low forever, so F r has a looping counterexample
        let properties = check("register r\n\ninit !r\ntrans r' <-> r\n\nassert F r\n", 3);
        assert!(properties.properties[0].is_refuted());
    }

    #[test]
    fn test_bmc_proves_nothing_but_leaves_liveness_open_when_it_holds() {
        // r rises after one step and stays; F r has no looping
        // counterexample within the bound
        let properties = check("register r\n\ninit !r\ntrans r'\n\nassert F r\n", 3);
        assert_eq!(properties.properties[0].status, Status::Open);
    }

    #[test]
    fn test_bmc_marks_unsupported_shapes() {
        let properties = check(
            "register r\n\ninit !r\ntrans r' <-> r\n\nassert always weak(r[*])\n",
            2,
        );
        assert!(properties.properties[0].is_unsupported());
    }
}
