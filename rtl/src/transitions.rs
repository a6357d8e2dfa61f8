// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Extract a transition system and its properties from a Module.

use crate::syntax::*;
use crate::temporal::has_temporal_operator;
use thiserror::Error;

/// A synchronous transition system: a signature, an initial-state
/// predicate over the unprimed symbols, and a transition relation over
/// primed and unprimed symbols.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TransitionSystem {
    /// The declared symbols
    pub signature: Signature,
    /// Initial-state predicate, instantiated at frame 0
    pub init: Expr,
    /// Transition relation; instantiated at frame `c` it relates the
    /// frames `c` and `c+1`
    pub trans: Expr,
}

/// A property pulled out of a Module, not yet tracked by the checker.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PropertyDecl {
    /// Label from the source, or a generated one
    pub name: String,
    /// Whether the property is an assumption
    pub assumed: bool,
    /// The property expression
    pub expr: Expr,
}

/// An error during transition system extraction
#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    /// Every symbol must be declared before use
    #[error("symbol {0} is not declared")]
    UnknownSymbol(String),
    /// The initial-state predicate talks about one frame only
    #[error("the initial-state predicate must not contain primes: {0}")]
    PrimeInInit(Expr),
    /// Properties talk about the future through temporal operators, not primes
    #[error("properties must not contain primes: {0}")]
    PrimeInProperty(Expr),
    /// `init` and `trans` are plain state formulas
    #[error("temporal operator in {0} statement: {1}")]
    TemporalInStatement(&'static str, Expr),
    /// Primes may only be applied to declared symbols
    #[error("prime applied to non-symbol: {0}")]
    PrimeOnNonSymbol(Expr),
}

fn has_prime(e: &Expr) -> bool {
    e.contains(&|e| matches!(e, Expr::UnaryOp(UOp::Prime, _)))
}

fn check_symbols(e: &Expr, sig: &Signature) -> Result<(), ExtractionError> {
    match e {
        Expr::Id(name) if !sig.contains_name(name) => {
            Err(ExtractionError::UnknownSymbol(name.clone()))
        }
        Expr::UnaryOp(UOp::Prime, op) if !matches!(op.as_ref(), Expr::Id(_)) => {
            Err(ExtractionError::PrimeOnNonSymbol((**op).clone()))
        }
        _ => e
            .children()
            .into_iter()
            .try_for_each(|e| check_symbols(e, sig)),
    }
}

/// Destructure a Module into a transition system and its properties.
/// The `init` and `trans` statements are conjoined in source order;
/// unnamed properties get the names `p0`, `p1`, ... by position.
pub fn extract(module: &Module) -> Result<(TransitionSystem, Vec<PropertyDecl>), ExtractionError> {
    let mut inits = Vec::new();
    let mut trans = Vec::new();
    let mut properties = Vec::new();

    for statement in &module.statements {
        match statement {
            Stmt::Init(e) => {
                check_symbols(e, &module.signature)?;
                if has_prime(e) {
                    return Err(ExtractionError::PrimeInInit(e.clone()));
                }
                if has_temporal_operator(e) {
                    return Err(ExtractionError::TemporalInStatement("init", e.clone()));
                }
                inits.push(e.clone());
            }
            Stmt::Trans(e) => {
                check_symbols(e, &module.signature)?;
                if has_temporal_operator(e) {
                    return Err(ExtractionError::TemporalInStatement("trans", e.clone()));
                }
                trans.push(e.clone());
            }
            Stmt::Assume { name, property } | Stmt::Assert { name, property } => {
                check_symbols(property, &module.signature)?;
                if has_prime(property) {
                    return Err(ExtractionError::PrimeInProperty(property.clone()));
                }
                let name = name
                    .clone()
                    .unwrap_or_else(|| format!("p{}", properties.len()));
                properties.push(PropertyDecl {
                    name,
                    assumed: matches!(statement, Stmt::Assume { .. }),
                    expr: property.clone(),
                });
            }
        }
    }

    let system = TransitionSystem {
        signature: module.signature.clone(),
        init: Expr::and(inits),
        trans: Expr::and(trans),
    };

    Ok((system, properties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_extract_basic() {
        let module = parse(
            "
register r
input inp

init !r
trans r' <-> (r | inp)

assert safe: G !r
assume env: always !inp
",
        )
        .unwrap();
        let (system, properties) = extract(&module).unwrap();

        assert_eq!(system.signature.symbols.len(), 2);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].name, "safe");
        assert!(!properties[0].assumed);
        assert_eq!(properties[1].name, "env");
        assert!(properties[1].assumed);
    }

    #[test]
    fn test_extract_rejects_primes_in_init() {
        let module = parse("register r\n\ninit r'\n").unwrap();
        assert!(matches!(
            extract(&module),
            Err(ExtractionError::PrimeInInit(_)),
        ));
    }

    #[test]
    fn test_extract_rejects_unknown_symbols() {
        let module = parse("register r\n\ninit !q\n").unwrap();
        assert_eq!(
            extract(&module),
            Err(ExtractionError::UnknownSymbol("q".to_string())),
        );
    }

    #[test]
    fn test_extract_names_unnamed_properties() {
        let module = parse("register r\n\ninit !r\ntrans r' <-> r\n\nassert G !r\n").unwrap();
        let (_, properties) = extract(&module).unwrap();
        assert_eq!(properties[0].name, "p0");
    }
}
