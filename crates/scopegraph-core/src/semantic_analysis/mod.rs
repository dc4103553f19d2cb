// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope-tree construction and name binding.
//!
//! Each translation unit goes through three strictly ordered phases:
//! 1. [`scope_builder`] opens a scope for every record, method, block, loop
//!    and catch clause.
//! 2. [`declarations`] binds every declared name, plus the synthetic `this`
//!    and `Outer.this` receivers, into the scope that owns it.
//! 3. [`name_resolver`] and [`member_resolver`] work out what every
//!    reference denotes, against the fully populated tree.
//!
//! Cross-unit lookups (superclasses, field types, fields of other records) go
//! through a read-only [`RecordIndex`] built from every unit before any unit
//! is resolved, so units can be resolved in parallel.
//!
//! Only the resolved slots of the AST are written, and only once a unit has
//! gone through all three phases; an aborted unit is left untouched.

use crate::ast::TranslationUnit;
use ecow::EcoString;
use serde::Deserialize;
use tracing::{debug, warn};

pub mod ambiguous_shadow;
pub mod declarations;
pub mod error;
mod member_resolver;
pub mod name_resolver;
pub mod record_index;
pub mod scope;
pub mod scope_builder;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use ambiguous_shadow::check_ambiguous_shadows;
pub use declarations::{DeclKind, DeclTable, Declaration, register_declarations};
pub use error::{ResolveError, ResolveErrorKind, Severity, UnresolvedReason};
pub use name_resolver::{ReferenceSite, ReferenceSlots, Resolutions, resolve_references};
pub use record_index::{
    ExternalField, ExternalRecord, FieldInfo, FieldLookup, RecordCollision, RecordIndex,
    RecordIndexBuilder, RecordInfo, RecordOrigin, TypeContext,
};
pub use scope::{Binding, BindingKind, Scope, ScopeId, ScopeKind, ScopeTree};
pub use scope_builder::build_scope_tree;

/// Switches for the optional diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
    /// Warn when a name also denotes a local in a sibling scope.
    pub report_ambiguous_shadows: bool,
    /// Report every reference left unresolved as a note.
    pub report_unresolved: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            report_ambiguous_shadows: true,
            report_unresolved: false,
        }
    }
}

/// Result of analysing one translation unit.
#[derive(Debug, Clone)]
pub struct UnitAnalysis {
    pub unit: EcoString,
    pub scope_tree: ScopeTree,
    pub declarations: DeclTable,
    pub resolutions: Resolutions,
    /// Recoverable issues of all phases, in source order.
    pub issues: Vec<ResolveError>,
}

impl UnitAnalysis {
    /// Returns true if any issue has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity() == Severity::Error)
    }

    /// Issues of exactly `severity`.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &ResolveError> {
        self.issues.iter().filter(move |i| i.severity() == severity)
    }
}

/// Runs all three phases over `unit` without touching it.
///
/// `index` must contain the records of `unit` and of every unit its
/// references may reach.
///
/// # Errors
///
/// Returns the [`MalformedScopeNesting`](ResolveErrorKind::MalformedScopeNesting)
/// error that aborted the unit.
pub fn resolve_unit(
    unit: &TranslationUnit,
    index: &RecordIndex,
    options: &ResolveOptions,
) -> Result<UnitAnalysis, ResolveError> {
    let mut scope_tree = build_scope_tree(unit)?;
    debug!(unit = %unit.name, scopes = scope_tree.len(), "built scope tree");

    let (declarations, mut issues) = register_declarations(unit, &mut scope_tree)?;
    debug!(
        unit = %unit.name,
        declarations = declarations.len(),
        duplicates = issues.len(),
        "registered declarations"
    );

    let output = resolve_references(unit, &scope_tree, &declarations, index, options)?;
    debug!(
        unit = %unit.name,
        references = output.resolutions.visited_count(),
        resolved = output.resolutions.resolved_count(),
        "resolved references"
    );
    issues.extend(output.issues);
    issues.extend(record_collisions(&scope_tree, index));
    if options.report_ambiguous_shadows {
        issues.extend(check_ambiguous_shadows(&scope_tree, &output.sites));
    }
    issues.sort_by_key(|issue| issue.span.start());

    Ok(UnitAnalysis {
        unit: unit.name.clone(),
        scope_tree,
        declarations,
        resolutions: output.resolutions,
        issues,
    })
}

/// Records of this unit whose qualified name another unit already took.
/// Clashes within the unit are reported as duplicate declarations.
fn record_collisions<'a>(
    scope_tree: &'a ScopeTree,
    index: &'a RecordIndex,
) -> impl Iterator<Item = ResolveError> + 'a {
    index
        .collisions()
        .iter()
        .filter(|collision| {
            scope_tree.scope_of(collision.dropped).is_some()
                && scope_tree.scope_of(collision.kept).is_none()
        })
        .filter_map(|collision| {
            let dropped = index.record_by_id(collision.dropped)?;
            Some(ResolveError::duplicate(
                collision.name.clone(),
                collision.kept_span,
                dropped.span,
            ))
        })
}

/// Analyses `unit` and writes the results into its resolved slots.
///
/// Running it again on the same unit yields the same slots.
///
/// # Errors
///
/// Returns the error that aborted the unit; the unit is then left untouched.
#[tracing::instrument(skip_all, fields(unit = %unit.name))]
pub fn analyse_unit(
    unit: &mut TranslationUnit,
    index: &RecordIndex,
    options: &ResolveOptions,
) -> Result<UnitAnalysis, ResolveError> {
    match resolve_unit(unit, index, options) {
        Ok(analysis) => {
            analysis.resolutions.apply(unit);
            Ok(analysis)
        }
        Err(error) => {
            warn!(%error, "unit aborted");
            Err(error)
        }
    }
}

/// Analyses every unit, each on its own thread, sharing `index` read-only.
///
/// Results are returned in unit order. An aborted unit does not affect the
/// others.
pub fn analyse_program(
    units: &mut [TranslationUnit],
    index: &RecordIndex,
    options: &ResolveOptions,
) -> Vec<Result<UnitAnalysis, ResolveError>> {
    debug!(units = units.len(), records = index.len(), "analysing program");
    std::thread::scope(|s| {
        let handles: Vec<_> = units
            .iter_mut()
            .map(|unit| s.spawn(move || analyse_unit(unit, index, options)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}
