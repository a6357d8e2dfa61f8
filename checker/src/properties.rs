// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The property set the checker works through, and the life cycle of
//! each property.

use rtl::nnf;
use rtl::syntax::Expr;
use rtl::transitions::PropertyDecl;
use serde::Serialize;
use std::fmt;

/// Where a property stands. Every property starts `Open` (or `Assumed`);
/// checkers move it forward and never move it back, with one exception:
/// a refutation that may depend on a dropped assumption is weakened to
/// `Inconclusive`.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub enum Status {
    /// Not decided yet
    Open,
    /// Taken as given, not checked
    Assumed,
    /// Excluded from checking by the user
    Disabled,
    /// Shown to hold, with a short justification such as `2-induction`
    Proved(String),
    /// Shown not to hold by a counterexample of the given length
    Refuted {
        /// Number of frames in the counterexample
        trace_length: usize,
    },
    /// The checker cannot handle the property's shape
    Unsupported(String),
    /// The check ran but decided nothing
    Inconclusive,
    /// An external failure; never cleared by the checker
    Failure(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Open => write!(f, "OPEN"),
            Status::Assumed => write!(f, "ASSUMED"),
            Status::Disabled => write!(f, "DISABLED"),
            Status::Proved(justification) => write!(f, "PROVED ({justification})"),
            Status::Refuted { trace_length } => {
                write!(f, "REFUTED (trace of length {trace_length})")
            }
            Status::Unsupported(reason) => write!(f, "UNSUPPORTED ({reason})"),
            Status::Inconclusive => write!(f, "INCONCLUSIVE"),
            Status::Failure(reason) => write!(f, "FAILURE ({reason})"),
        }
    }
}

/// One tracked property: the source expr, its negation-normal-form
/// rendition the compilers work on, and where the check stands.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Property {
    /// The label from the input
    pub name: String,
    /// The property as written
    pub expr: Expr,
    /// The property in negation normal form
    pub normalized: Expr,
    /// Where the check stands
    pub status: Status,
}

impl Property {
    /// Track a new property, normalizing it up front.
    pub fn new<S: AsRef<str>>(name: S, expr: Expr) -> Self {
        let normalized = nnf::normalize(&expr);
        Property {
            name: name.as_ref().to_string(),
            expr,
            normalized,
            status: Status::Open,
        }
    }

    /// Whether the property is an assumption.
    pub fn is_assumed(&self) -> bool {
        self.status == Status::Assumed
    }

    /// Whether the property is excluded from checking.
    pub fn is_disabled(&self) -> bool {
        self.status == Status::Disabled
    }

    /// Whether the property has a full proof.
    pub fn is_proved(&self) -> bool {
        matches!(self.status, Status::Proved(_))
    }

    /// Whether the property has a counterexample.
    pub fn is_refuted(&self) -> bool {
        matches!(self.status, Status::Refuted { .. })
    }

    /// Whether the property was put aside as unsupported.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.status, Status::Unsupported(_))
    }

    /// Whether an external failure was recorded.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, Status::Failure(_))
    }

    /// Put the property aside as unsupported.
    pub fn unsupported(&mut self, reason: &str) {
        self.status = Status::Unsupported(reason.to_string());
    }

    /// Record a full proof.
    pub fn proved(&mut self, justification: String) {
        self.status = Status::Proved(justification);
    }

    /// Record a counterexample of `trace_length` frames.
    pub fn refuted(&mut self, trace_length: usize) {
        self.status = Status::Refuted { trace_length };
    }

    /// Record that the check decided nothing.
    pub fn inconclusive(&mut self) {
        self.status = Status::Inconclusive;
    }

    /// Record an external failure.
    pub fn failure(&mut self, reason: &str) {
        self.status = Status::Failure(reason.to_string());
    }
}

/// The properties of one checker run, in input order. Iteration order is
/// stable so that reported statuses are reproducible.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Properties {
    /// The tracked properties
    pub properties: Vec<Property>,
}

impl Properties {
    /// Track the properties extracted from a module; `assume`
    /// declarations start out `Assumed`.
    pub fn from_decls(decls: &[PropertyDecl]) -> Self {
        let properties = decls
            .iter()
            .map(|decl| {
                let mut p = Property::new(&decl.name, decl.expr.clone());
                if decl.assumed {
                    p.status = Status::Assumed;
                }
                p
            })
            .collect();
        Properties { properties }
    }

    /// Look up a property by name.
    pub fn find(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A serializable per-property verdict for reports.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct PropertyReport {
    /// The property's label
    pub name: String,
    /// The final status
    pub status: Status,
}

impl Properties {
    /// The verdicts of all properties, for reporting.
    pub fn report(&self) -> Vec<PropertyReport> {
        self.properties
            .iter()
            .map(|p| PropertyReport {
                name: p.name.clone(),
                status: p.status.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtl::parser::term;

    #[test]
    fn test_new_property_is_normalized() {
        let p = Property::new("p", term("!(G r)"));
        assert_eq!(p.normalized, term("F !r"));
        assert_eq!(p.status, Status::Open);
    }

    #[test]
    fn test_status_predicates() {
        let mut p = Property::new("p", term("G r"));
        assert!(!p.is_proved());
        p.proved("2-induction".to_string());
        assert!(p.is_proved());
        assert_eq!(p.status.to_string(), "PROVED (2-induction)");
    }
}
