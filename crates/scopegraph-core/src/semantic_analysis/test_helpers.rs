// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for `semantic_analysis` tests.

use crate::ast::{Expression, NodeId, Resolution, Statement, TranslationUnit};
use crate::ast_walker::for_each_expression;
use crate::semantic_analysis::name_resolver::ReferenceSlots;
use crate::semantic_analysis::record_index::RecordIndex;
use crate::semantic_analysis::{ResolveOptions, UnitAnalysis, analyse_program};

pub fn expr_stmt(expr: Expression) -> Statement {
    Statement::Expression(expr)
}

/// Resolves `units` against an index of themselves with default options.
pub fn resolve(units: &mut [TranslationUnit]) -> Vec<UnitAnalysis> {
    resolve_with(units, &ResolveOptions::default())
}

pub fn resolve_with(units: &mut [TranslationUnit], options: &ResolveOptions) -> Vec<UnitAnalysis> {
    let index = RecordIndex::build(units);
    resolve_against(units, &index, options)
}

/// Resolves `units` and unwraps every unit's result.
pub fn resolve_against(
    units: &mut [TranslationUnit],
    index: &RecordIndex,
    options: &ResolveOptions,
) -> Vec<UnitAnalysis> {
    analyse_program(units, index, options)
        .into_iter()
        .map(|result| result.expect("unit should not be aborted"))
        .collect()
}

/// The slots written into the simple reference `id`, if it exists in `unit`.
pub fn reference_slots(unit: &TranslationUnit, id: NodeId) -> Option<ReferenceSlots> {
    let mut found = None;
    for_each_expression(unit, &mut |expr| {
        if let Expression::Reference(reference) = expr {
            if reference.id == id {
                found = Some(ReferenceSlots {
                    resolved: reference.resolved,
                    implicit_base: reference.implicit_base,
                });
            }
        }
    });
    found
}

/// The resolution written into the member access `id`.
pub fn member_resolution(unit: &TranslationUnit, id: NodeId) -> Option<Resolution> {
    let mut found = None;
    for_each_expression(unit, &mut |expr| {
        if let Expression::Member(access) = expr {
            if access.id == id {
                found = access.resolved;
            }
        }
    });
    found
}
