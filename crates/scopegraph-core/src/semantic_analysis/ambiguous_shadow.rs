// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic: warn when a name also denotes a local in a sibling scope.
//!
//! Nearest-wins resolution looks only along the reference's own scope chain.
//! A lookup that flattens a method's locals by name would instead pick up a
//! same-named local from a sibling block, loop or catch clause. Resolution
//! does not change; the reference just gets a warning naming the other local.
//!
//! ```text
//! for (int v : a) { use(v); }   // Warning: v also names a local in a sibling scope
//! for (int v : b) { use(v); }   // Warning: same, pointing at the first loop
//! v;                            // Warning when v resolves to a field
//! ```

use crate::semantic_analysis::error::{ResolveError, ResolveErrorKind};
use crate::semantic_analysis::name_resolver::ReferenceSite;
use crate::semantic_analysis::scope::{Binding, BindingKind, ScopeId, ScopeKind, ScopeTree};
use std::collections::HashMap;

/// Locals of block, loop and catch scopes, keyed by enclosing method and
/// name, in scope order.
type MethodLocals<'a> = HashMap<(ScopeId, &'a str), Vec<(ScopeId, &'a Binding)>>;

fn method_locals(tree: &ScopeTree) -> MethodLocals<'_> {
    let mut locals: MethodLocals<'_> = HashMap::new();
    for scope in tree.iter() {
        if !matches!(scope.kind, ScopeKind::Block | ScopeKind::Loop | ScopeKind::Catch) {
            continue;
        }
        let Some(method) = tree.enclosing_method(scope.id) else {
            continue;
        };
        for binding in scope.bindings().filter(|b| b.kind == BindingKind::Local) {
            locals
                .entry((method, binding.name.as_str()))
                .or_default()
                .push((scope.id, binding));
        }
    }
    locals
}

/// Returns one warning per reference site that has a same-named local off its
/// scope chain within the same method.
#[must_use]
pub fn check_ambiguous_shadows(tree: &ScopeTree, sites: &[ReferenceSite]) -> Vec<ResolveError> {
    let locals = method_locals(tree);
    let mut warnings = Vec::new();
    for site in sites {
        let Some(method) = tree.enclosing_method(site.scope) else {
            continue;
        };
        let Some(candidates) = locals.get(&(method, site.name.as_str())) else {
            continue;
        };
        let chosen = site.resolved.map(|r| r.target);
        let other = candidates.iter().find(|(scope, binding)| {
            Some(binding.target) != chosen && !tree.is_ancestor(*scope, site.scope)
        });
        if let Some((_, other)) = other {
            warnings.push(ResolveError::new(
                ResolveErrorKind::AmbiguousShadow {
                    name: site.name.clone(),
                    other: other.defined_at,
                },
                site.span,
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Block, Expression, FieldDecl, LocalDecl, MethodDecl, NodeIdGen, RecordDecl, Statement,
        TranslationUnit, TypeRef,
    };
    use crate::semantic_analysis::test_helpers::{expr_stmt, resolve, resolve_with};
    use crate::semantic_analysis::ResolveOptions;
    use crate::source_analysis::Span;

    fn loop_over(
        ids: &mut NodeIdGen,
        var: &str,
        var_span: Span,
        body: Vec<Statement>,
    ) -> Statement {
        let variable = LocalDecl::new(ids, var, TypeRef::named("int")).with_span(var_span);
        let iterable = Expression::reference(ids, "items");
        let body = Statement::Block(Block::new(ids, body));
        Statement::for_each(ids, variable, iterable, body)
    }

    fn shadow_warnings(analysis: &crate::semantic_analysis::UnitAnalysis) -> Vec<&ResolveError> {
        analysis
            .issues
            .iter()
            .filter(|i| matches!(i.kind, ResolveErrorKind::AmbiguousShadow { .. }))
            .collect()
    }

    #[test]
    fn sibling_loops_with_same_variable_warn() {
        let mut ids = NodeIdGen::new();
        let first_use = Expression::reference(&mut ids, "v");
        let first = loop_over(&mut ids, "v", Span::new(10, 11), vec![expr_stmt(first_use)]);
        let second_use = Expression::reference(&mut ids, "v");
        let second = loop_over(&mut ids, "v", Span::new(50, 51), vec![expr_stmt(second_use)]);
        let body = Block::new(&mut ids, vec![first, second]);
        let record =
            RecordDecl::new(&mut ids, "R").with_method(MethodDecl::new(&mut ids, "f", body));
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let analysis = resolve(&mut units);
        let warnings = shadow_warnings(&analysis[0]);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0].kind,
            ResolveErrorKind::AmbiguousShadow { other, .. } if other == Span::new(50, 51)
        ));
        assert!(matches!(
            warnings[1].kind,
            ResolveErrorKind::AmbiguousShadow { other, .. } if other == Span::new(10, 11)
        ));
    }

    #[test]
    fn field_use_after_loops_warns() {
        let mut ids = NodeIdGen::new();
        let first = loop_over(&mut ids, "v", Span::new(10, 11), vec![]);
        let after = Expression::reference(&mut ids, "v");
        let body = Block::new(&mut ids, vec![first, expr_stmt(after)]);
        let record = RecordDecl::new(&mut ids, "R")
            .with_field(FieldDecl::new(&mut ids, "v", TypeRef::named("int")))
            .with_method(MethodDecl::new(&mut ids, "f", body));
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let analysis = resolve(&mut units);
        assert_eq!(shadow_warnings(&analysis[0]).len(), 1);
    }

    #[test]
    fn nested_shadowing_on_the_chain_is_quiet() {
        let mut ids = NodeIdGen::new();
        let inner_use = Expression::reference(&mut ids, "v");
        let inner = Block::new(&mut ids, vec![expr_stmt(inner_use)]);
        let local = LocalDecl::new(&mut ids, "v", TypeRef::named("int"));
        let body = Block::new(&mut ids, vec![Statement::Local(local), Statement::Block(inner)]);
        let record =
            RecordDecl::new(&mut ids, "R").with_method(MethodDecl::new(&mut ids, "f", body));
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let analysis = resolve(&mut units);
        assert!(shadow_warnings(&analysis[0]).is_empty());
    }

    #[test]
    fn other_methods_do_not_count() {
        let mut ids = NodeIdGen::new();
        let elsewhere = loop_over(&mut ids, "v", Span::new(10, 11), vec![]);
        let other_body = Block::new(&mut ids, vec![elsewhere]);
        let other = MethodDecl::new(&mut ids, "g", other_body);
        let use_site = Expression::reference(&mut ids, "v");
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "f", body);
        let record = RecordDecl::new(&mut ids, "R")
            .with_field(FieldDecl::new(&mut ids, "v", TypeRef::named("int")))
            .with_method(other)
            .with_method(method);
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let analysis = resolve(&mut units);
        assert!(shadow_warnings(&analysis[0]).is_empty());
    }

    #[test]
    fn can_be_switched_off() {
        let mut ids = NodeIdGen::new();
        let first_use = Expression::reference(&mut ids, "v");
        let first = loop_over(&mut ids, "v", Span::new(10, 11), vec![expr_stmt(first_use)]);
        let second = loop_over(&mut ids, "v", Span::new(50, 51), vec![]);
        let body = Block::new(&mut ids, vec![first, second]);
        let record =
            RecordDecl::new(&mut ids, "R").with_method(MethodDecl::new(&mut ids, "f", body));
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let options = ResolveOptions {
            report_ambiguous_shadows: false,
            ..ResolveOptions::default()
        };
        let analysis = resolve_with(&mut units, &options);
        assert!(shadow_warnings(&analysis[0]).is_empty());
    }

    #[test]
    fn locals_are_grouped_per_method_in_scope_order() {
        let mut ids = NodeIdGen::new();
        let first = loop_over(&mut ids, "v", Span::new(10, 11), vec![]);
        let second = loop_over(&mut ids, "v", Span::new(50, 51), vec![]);
        let f_body = Block::new(&mut ids, vec![first, second]);
        let f = MethodDecl::new(&mut ids, "f", f_body);
        let f_id = f.id;
        let elsewhere = loop_over(&mut ids, "v", Span::new(90, 91), vec![]);
        let g_body = Block::new(&mut ids, vec![elsewhere]);
        let g = MethodDecl::new(&mut ids, "g", g_body);
        let record = RecordDecl::new(&mut ids, "R").with_method(f).with_method(g);
        let unit = TranslationUnit::new(&mut ids, "R.java").with_record(record);
        let mut tree = crate::semantic_analysis::build_scope_tree(&unit).unwrap();
        crate::semantic_analysis::register_declarations(&unit, &mut tree).unwrap();

        let locals = method_locals(&tree);
        let f_scope = tree.scope_of(f_id).unwrap();
        let spans: Vec<Span> = locals[&(f_scope, "v")]
            .iter()
            .map(|(_, binding)| binding.defined_at)
            .collect();
        assert_eq!(spans, vec![Span::new(10, 11), Span::new(50, 51)]);
        assert_eq!(locals.len(), 2);
    }
}
