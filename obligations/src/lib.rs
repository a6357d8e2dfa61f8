// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Compilation of temporal properties into per-timeframe obligations
//! over an unwound transition system.

// configure clippy
#![allow(clippy::needless_return)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod property;
pub mod sequence;
pub mod set;

use rtl::syntax::Expr;
use thiserror::Error;

/// An error while compiling a property into obligations.
#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    /// A negation could not be pushed below a temporal operator
    #[error("cannot produce negation normal form below {0}")]
    NnfFailure(Expr),
    /// A `$` upper bound appeared where only finite ranges can be encoded
    #[error("unbounded range is not supported here")]
    UnboundedRange,
    /// A range constant is negative where a cycle count is required
    #[error("range index failed to convert or is negative")]
    IndexOutOfRange,
    /// The property's shape lies outside the supported fragment; the
    /// checker reports this as a property status, not as a run failure
    #[error("the property shape is not supported")]
    Unsupported,
}

pub(crate) fn cycles(n: i64) -> Result<usize, CompileError> {
    usize::try_from(n).map_err(|_| CompileError::IndexOutOfRange)
}
