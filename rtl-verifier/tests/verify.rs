// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end runs over the example files.

use checker::bmc::bmc;
use checker::induction::k_induction;
use checker::properties::{Properties, Status};
use checker::CheckError;
use rtl::transitions::{extract, TransitionSystem};
use solver::backends::CadicalBackend;

fn load(source: &str) -> (TransitionSystem, Properties) {
    let module = rtl::parser::parse(source).expect("parse error");
    let (system, decls) = extract(&module).expect("extraction error");
    (system, Properties::from_decls(&decls))
}

#[test]
fn test_counter_is_proved_by_induction() {
    let (system, properties) = load(include_str!("examples/counter.rtl"));
    let result = k_induction(1, &system, &properties, &CadicalBackend::new).unwrap();
    assert_eq!(
        result.find("top_bit_low").unwrap().status,
        Status::Proved("1-induction".to_string()),
    );
}

#[test]
fn test_toggle_is_refuted_in_the_base_case() {
    let (system, properties) = load(include_str!("examples/toggle.rtl"));
    let result = k_induction(3, &system, &properties, &CadicalBackend::new).unwrap();
    assert_eq!(
        result.find("stays_low").unwrap().status,
        Status::Refuted { trace_length: 2 },
    );
}

#[test]
fn test_handshake_holds_within_the_bound() {
    let (system, mut properties) = load(include_str!("examples/handshake.rtl"));
    bmc(4, &system, &mut properties, &CadicalBackend::new).unwrap();
    assert_eq!(properties.find("granted").unwrap().status, Status::Open);
}

#[test]
fn test_handshake_is_outside_the_induction_fragment() {
    let (system, properties) = load(include_str!("examples/handshake.rtl"));
    assert_eq!(
        k_induction(2, &system, &properties, &CadicalBackend::new),
        Err(CheckError::NoSupportedProperty),
    );
}
