// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Bounded model checking and k-induction over transition systems.

// configure clippy
#![allow(clippy::needless_return)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bmc;
pub mod induction;
pub mod properties;
pub mod unwind;

use rtl::syntax::Expr;
use thiserror::Error;

/// An error that aborts a checker run. Shapes the checker cannot handle
/// are not errors; they become per-property `unsupported` statuses.
#[derive(Debug, Error, PartialEq)]
pub enum CheckError {
    /// The property set is empty
    #[error("no properties")]
    NoProperties,
    /// Nothing in the property set fits the supported fragment
    #[error("there is no property suitable for k-induction")]
    NoSupportedProperty,
    /// A negation could not be pushed below a temporal operator
    #[error("cannot produce negation normal form below {0}")]
    NnfFailure(Expr),
    /// A `$` upper bound appeared where only finite ranges can be encoded
    #[error("unbounded range is not supported here")]
    UnboundedRange,
    /// A range constant is negative where a cycle count is required
    #[error("range index failed to convert or is negative")]
    IndexOutOfRange,
    /// The decision procedure failed
    #[error("error from decision procedure")]
    SolverError,
}
