// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reference resolution (phase 3).
//!
//! Walks the unit once more, now against a fully populated scope tree, and
//! works out what every reference denotes. Nothing is written to the AST
//! here: results go into a [`Resolutions`] side table that
//! [`Resolutions::apply`] copies into the resolved slots afterwards.
//!
//! A bare name is looked up outward from the innermost scope, nearest scope
//! first. Block scopes only offer locals declared at or before the reference.
//! At each Record scope the record's own bindings are checked, then the
//! fields it inherits; a field hit there becomes an implicit member access
//! whose receiver is `this` (innermost record) or the matching `Outer.this`.
//! Receivers stop being reachable past a static method, a static nested
//! record, or inside a static field initializer; a field found beyond that
//! point gets the record itself as base. Record names are only tried once no
//! variable of that name is found anywhere along the chain.
//!
//! Qualified references (`base.member`) are handled in
//! [`super::member_resolver`].

use crate::ast::{
    Block, Expression, MethodDecl, NodeId, RecordDecl, Reference, Resolution, Statement,
    TranslationUnit,
};
use crate::ast_walker::for_each_expression_mut;
use crate::semantic_analysis::ResolveOptions;
use crate::semantic_analysis::declarations::DeclTable;
use crate::semantic_analysis::error::{ResolveError, ResolveErrorKind, UnresolvedReason};
use crate::semantic_analysis::record_index::{RecordIndex, RecordInfo, TypeContext, qualify};
use crate::semantic_analysis::scope::{Binding, BindingKind, ScopeId, ScopeKind, ScopeTree};
use crate::source_analysis::Span;
use ecow::EcoString;
use std::collections::HashMap;
use tracing::trace;

/// The two slots of a simple reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceSlots {
    pub resolved: Option<Resolution>,
    pub implicit_base: Option<Resolution>,
}

/// Resolved slot contents for one unit, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolutions {
    references: HashMap<NodeId, ReferenceSlots>,
    members: HashMap<NodeId, Resolution>,
}

impl Resolutions {
    /// Slots computed for the simple reference `id`.
    #[must_use]
    pub fn reference(&self, id: NodeId) -> Option<ReferenceSlots> {
        self.references.get(&id).copied()
    }

    /// Resolution computed for the member access `id`.
    #[must_use]
    pub fn member(&self, id: NodeId) -> Option<Resolution> {
        self.members.get(&id).copied()
    }

    /// Number of references and member accesses that resolved.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.references
            .values()
            .filter(|slots| slots.resolved.is_some())
            .count()
            + self.members.len()
    }

    /// Number of simple references and member accesses visited.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.references.len() + self.members.len()
    }

    pub(super) fn insert_member(&mut self, id: NodeId, resolution: Resolution) {
        self.members.insert(id, resolution);
    }

    /// Writes these results into `unit`'s resolved slots.
    ///
    /// Every slot is cleared first, so applying the same results twice
    /// leaves the tree unchanged.
    pub fn apply(&self, unit: &mut TranslationUnit) {
        for_each_expression_mut(unit, &mut |expr| match expr {
            Expression::Reference(reference) => {
                let slots = self.reference(reference.id).unwrap_or_default();
                reference.resolved = slots.resolved;
                reference.implicit_base = slots.implicit_base;
            }
            Expression::Member(access) => {
                access.resolved = self.member(access.id);
            }
            _ => {}
        });
    }
}

/// A simple reference together with the scope it was looked up from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub id: NodeId,
    pub name: EcoString,
    pub scope: ScopeId,
    pub span: Span,
    pub resolved: Option<Resolution>,
}

/// Everything phase 3 produces.
#[derive(Debug, Clone, Default)]
pub struct ResolverOutput {
    pub resolutions: Resolutions,
    pub sites: Vec<ReferenceSite>,
    pub issues: Vec<ResolveError>,
}

/// Resolves every reference in `unit`.
///
/// `index` must contain the records of `unit` itself as well as those of any
/// other unit its references may reach.
///
/// # Errors
///
/// Returns [`MalformedScopeNesting`](super::ResolveErrorKind::MalformedScopeNesting)
/// for a reference without a name or a scope-opening node with no scope in
/// `tree`.
pub fn resolve_references(
    unit: &TranslationUnit,
    tree: &ScopeTree,
    decls: &DeclTable,
    index: &RecordIndex,
    options: &ResolveOptions,
) -> Result<ResolverOutput, ResolveError> {
    let mut resolver = NameResolver {
        tree,
        decls,
        index,
        unit,
        options,
        static_initializer: false,
        output: ResolverOutput::default(),
    };
    for record in &unit.records {
        resolver.resolve_record(record)?;
    }
    Ok(resolver.output)
}

/// Outcome of looking up a bare name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SimpleHit {
    pub(super) resolved: Resolution,
    pub(super) implicit_base: Option<Resolution>,
    /// An instance member was reached without a receiver.
    pub(super) static_context: bool,
}

impl SimpleHit {
    pub(super) fn direct(resolved: Resolution) -> Self {
        Self {
            resolved,
            implicit_base: None,
            static_context: false,
        }
    }

    fn bound(binding: &Binding) -> Self {
        Self::direct(Resolution::new(binding.target, binding.kind))
    }
}

/// Phase-3 resolution service for one unit.
pub(super) struct NameResolver<'a> {
    pub(super) tree: &'a ScopeTree,
    pub(super) decls: &'a DeclTable,
    pub(super) index: &'a RecordIndex,
    unit: &'a TranslationUnit,
    options: &'a ResolveOptions,
    /// Set while resolving the initializer of a static field.
    static_initializer: bool,
    pub(super) output: ResolverOutput,
}

impl<'a> NameResolver<'a> {
    fn scope_of(&self, owner: NodeId, span: Span) -> Result<ScopeId, ResolveError> {
        self.tree
            .scope_of(owner)
            .ok_or_else(|| ResolveError::malformed(format!("no scope opened by {owner}"), span))
    }

    /// The context type names are written in at `scope`.
    pub(super) fn type_context(&self, scope: ScopeId) -> TypeContext<'a> {
        let (tree, unit) = (self.tree, self.unit);
        TypeContext {
            package: unit.package.as_deref(),
            imports: &unit.imports,
            enclosing: tree
                .chain(scope)
                .filter_map(|s| s.record.clone())
                .collect(),
        }
    }

    pub(super) fn report(&mut self, issue: ResolveError) {
        self.output.issues.push(issue);
    }

    pub(super) fn unresolved(&mut self, name: &str, reason: UnresolvedReason, span: Span) {
        if self.options.report_unresolved {
            self.report(ResolveError::unresolved(name, reason, span));
        }
    }

    // ── Walk ──────────────────────────────────────────────────────────────────

    fn resolve_record(&mut self, record: &RecordDecl) -> Result<(), ResolveError> {
        let scope = self.scope_of(record.id, record.span)?;
        for field in &record.fields {
            if let Some(init) = &field.initializer {
                self.static_initializer = field.is_static;
                let result = self.resolve_expression(init, scope);
                self.static_initializer = false;
                result?;
            }
        }
        for nested in &record.records {
            self.resolve_record(nested)?;
        }
        for method in &record.methods {
            self.resolve_method(method)?;
        }
        Ok(())
    }

    fn resolve_method(&mut self, method: &MethodDecl) -> Result<(), ResolveError> {
        if let Some(body) = &method.body {
            self.resolve_block(body)?;
        }
        Ok(())
    }

    fn resolve_block(&mut self, block: &Block) -> Result<(), ResolveError> {
        let scope = self.scope_of(block.id, block.span)?;
        for stmt in &block.statements {
            self.resolve_statement(stmt, scope)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, stmt: &Statement, scope: ScopeId) -> Result<(), ResolveError> {
        match stmt {
            Statement::Local(local) => {
                if let Some(init) = &local.initializer {
                    self.resolve_expression(init, scope)?;
                }
            }
            Statement::Expression(expr) => self.resolve_expression(expr, scope)?,
            Statement::Block(block) => self.resolve_block(block)?,
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expression(condition, scope)?;
                self.resolve_statement(then_branch, scope)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch, scope)?;
                }
            }
            Statement::For(for_loop) => {
                let loop_scope = self.scope_of(for_loop.id, for_loop.span)?;
                for init in &for_loop.init {
                    self.resolve_statement(init, loop_scope)?;
                }
                if let Some(condition) = &for_loop.condition {
                    self.resolve_expression(condition, loop_scope)?;
                }
                for update in &for_loop.update {
                    self.resolve_expression(update, loop_scope)?;
                }
                self.resolve_statement(&for_loop.body, loop_scope)?;
            }
            Statement::ForEach(for_each) => {
                let loop_scope = self.scope_of(for_each.id, for_each.span)?;
                // The iterable is evaluated before the loop variable exists.
                self.resolve_expression(&for_each.iterable, scope)?;
                self.resolve_statement(&for_each.body, loop_scope)?;
            }
            Statement::While(while_loop) => {
                let loop_scope = self.scope_of(while_loop.id, while_loop.span)?;
                self.resolve_expression(&while_loop.condition, loop_scope)?;
                self.resolve_statement(&while_loop.body, loop_scope)?;
            }
            Statement::Try(try_stmt) => {
                self.resolve_block(&try_stmt.body)?;
                for catch in &try_stmt.catches {
                    self.resolve_block(&catch.body)?;
                }
                if let Some(finally) = &try_stmt.finally {
                    self.resolve_block(finally)?;
                }
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expression(value, scope)?;
                }
            }
            Statement::Record(record) => self.resolve_record(record)?,
        }
        Ok(())
    }

    pub(super) fn resolve_expression(
        &mut self,
        expr: &Expression,
        scope: ScopeId,
    ) -> Result<(), ResolveError> {
        match expr {
            Expression::Reference(reference) => {
                self.resolve_reference(reference, scope)?;
            }
            Expression::Member(access) => {
                self.resolve_member(access, scope)?;
            }
            Expression::Literal { .. } => {}
            Expression::Call {
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    self.resolve_expression(receiver, scope)?;
                }
                for arg in arguments {
                    self.resolve_expression(arg, scope)?;
                }
            }
            Expression::New { arguments, .. } => {
                for arg in arguments {
                    self.resolve_expression(arg, scope)?;
                }
            }
            Expression::Assign { target, value, .. } => {
                self.resolve_expression(target, scope)?;
                self.resolve_expression(value, scope)?;
            }
            Expression::Binary { left, right, .. } => {
                self.resolve_expression(left, scope)?;
                self.resolve_expression(right, scope)?;
            }
            Expression::Unary { operand, .. } => self.resolve_expression(operand, scope)?,
            Expression::Cast { expression, .. } => self.resolve_expression(expression, scope)?,
            Expression::Index { target, index, .. } => {
                self.resolve_expression(target, scope)?;
                self.resolve_expression(index, scope)?;
            }
        }
        Ok(())
    }

    // ── Simple names ──────────────────────────────────────────────────────────

    fn resolve_reference(
        &mut self,
        reference: &Reference,
        scope: ScopeId,
    ) -> Result<Option<Resolution>, ResolveError> {
        if reference.name.is_empty() {
            return Err(ResolveError::malformed(
                format!("reference {} without a name", reference.id),
                reference.span,
            ));
        }
        let hit = self.lookup_simple(scope, &reference.name, reference.span);
        Ok(self.record_reference(reference, scope, hit))
    }

    /// Stores the outcome for `reference` and reports what needs reporting.
    pub(super) fn record_reference(
        &mut self,
        reference: &Reference,
        scope: ScopeId,
        hit: Option<SimpleHit>,
    ) -> Option<Resolution> {
        let resolved = hit.map(|h| h.resolved);
        let implicit_base = hit.and_then(|h| h.implicit_base);
        if hit.is_some_and(|h| h.static_context) {
            self.report(ResolveError::new(
                ResolveErrorKind::StaticContext {
                    name: reference.name.clone(),
                },
                reference.span,
            ));
        }
        match resolved {
            Some(res) => trace!(
                name = %reference.name,
                target = %res.target,
                kind = %res.kind,
                "resolved"
            ),
            None => self.unresolved(&reference.name, UnresolvedReason::NoBinding, reference.span),
        }
        self.output.resolutions.references.insert(
            reference.id,
            ReferenceSlots {
                resolved,
                implicit_base,
            },
        );
        self.output.sites.push(ReferenceSite {
            id: reference.id,
            name: reference.name.clone(),
            scope,
            span: reference.span,
            resolved,
        });
        resolved
    }

    /// The record named `name` at `at`, nearest scope first. Records local to
    /// a block are visible from their declaration on.
    pub(super) fn type_binding(&self, scope: ScopeId, name: &str, at: Span) -> Option<&'a Binding> {
        let tree = self.tree;
        tree.chain(scope).find_map(|s| {
            s.type_binding(name).filter(|binding| {
                s.kind != ScopeKind::Block || binding.defined_at.starts_no_later_than(at)
            })
        })
    }

    /// Resolves a type name written at `scope`. Record names bound along the
    /// scope chain come first, so local records are found; everything else
    /// goes through the index.
    pub(super) fn resolve_type_name(
        &self,
        name: &str,
        scope: ScopeId,
        at: Span,
    ) -> Option<&'a RecordInfo> {
        let index = self.index;
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if let Some(binding) = self.type_binding(scope, head, at) {
            let info = index.record_by_id(binding.target)?;
            return match rest {
                Some(rest) => index.get(&qualify(Some(&info.name), rest)),
                None => Some(info),
            };
        }
        index.resolve_type(name, &self.type_context(scope))
    }

    /// Looks `name` up from `scope` outward. Pure: nothing is recorded.
    pub(super) fn lookup_simple(&self, scope: ScopeId, name: &str, at: Span) -> Option<SimpleHit> {
        let mut receiver = !self.static_initializer;
        let mut level = 0;
        let mut innermost_record = None;

        for s in self.tree.chain(scope) {
            match s.kind {
                ScopeKind::Record => {
                    if innermost_record.is_none() {
                        innermost_record = Some((s.owner, receiver));
                    }
                    if let Some(binding) = s.binding(name) {
                        if binding.kind.is_field() {
                            let is_static = binding.kind == BindingKind::StaticField;
                            let field = binding.target;
                            return Some(field_hit(s.owner, level, receiver, field, is_static));
                        }
                        let mut hit = SimpleHit::bound(binding);
                        hit.static_context = binding.kind.is_receiver() && !receiver;
                        return Some(hit);
                    }
                    if let Some(hit) = self.inherited_field(s, name, level, receiver) {
                        return Some(hit);
                    }
                    if s.is_static {
                        receiver = false;
                    }
                    level += 1;
                }
                ScopeKind::Method => {
                    if let Some(binding) = s.binding(name) {
                        return Some(SimpleHit::bound(binding));
                    }
                    if s.is_static {
                        receiver = false;
                    }
                }
                ScopeKind::Block => {
                    let visible = s
                        .binding(name)
                        .filter(|binding| binding.defined_at.starts_no_later_than(at));
                    if let Some(binding) = visible {
                        return Some(SimpleHit::bound(binding));
                    }
                }
                ScopeKind::Global | ScopeKind::Loop | ScopeKind::Catch => {
                    if let Some(binding) = s.binding(name) {
                        return Some(SimpleHit::bound(binding));
                    }
                }
            }
        }

        // A variable obscures a record of the same name.
        if let Some(binding) = self.type_binding(scope, name, at) {
            let record = Resolution::new(binding.target, BindingKind::Record);
            return Some(SimpleHit::direct(record));
        }

        // `Outer.this` written inside `Outer` itself is plain `this`.
        let (record, receiver) = innermost_record?;
        let qualifier = name.strip_suffix(".this")?;
        if self.decls.get(record)?.name != qualifier {
            return None;
        }
        let mut hit = SimpleHit::direct(Resolution::new(record, BindingKind::This));
        hit.static_context = !receiver;
        Some(hit)
    }
}

/// A field reached by a bare name from the record `record`, `level` records
/// out from the reference.
pub(super) fn field_hit(
    record: NodeId,
    level: usize,
    receiver: bool,
    field: NodeId,
    is_static: bool,
) -> SimpleHit {
    let kind = if is_static {
        BindingKind::StaticField
    } else {
        BindingKind::Field
    };
    let base = match (receiver, level) {
        (true, 0) => Resolution::new(record, BindingKind::This),
        (true, _) => Resolution::new(record, BindingKind::OuterThis),
        (false, _) => Resolution::new(record, BindingKind::Record),
    };
    SimpleHit {
        resolved: Resolution::new(field, kind),
        implicit_base: Some(base),
        static_context: !receiver && !is_static,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldDecl, LocalDecl, NodeIdGen, ParamDecl, TypeRef};
    use crate::semantic_analysis::test_helpers::{expr_stmt, reference_slots, resolve, resolve_with};

    #[test]
    fn parameter_shadows_field() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "value");
        let use_id = reference_id(&use_site);
        let param = ParamDecl::new(&mut ids, "value", TypeRef::named("int"));
        let param_id = param.id;
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "set", body)
            .with_parameter(param);
        let record = RecordDecl::new(&mut ids, "Box")
            .with_field(FieldDecl::new(&mut ids, "value", TypeRef::named("int")))
            .with_method(method);
        let mut units = vec![TranslationUnit::new(&mut ids, "Box.java").with_record(record)];

        let analysis = resolve(&mut units);
        let slots = reference_slots(&units[0], use_id).unwrap();
        assert_eq!(slots.resolved, Some(Resolution::new(param_id, BindingKind::Parameter)));
        assert_eq!(slots.implicit_base, None);
        assert!(analysis[0].issues.is_empty());
    }

    #[test]
    fn bare_field_gets_this_as_implicit_base() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "count");
        let use_id = reference_id(&use_site);
        let field = FieldDecl::new(&mut ids, "count", TypeRef::named("int"));
        let field_id = field.id;
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "get", body);
        let record = RecordDecl::new(&mut ids, "Counter").with_field(field).with_method(method);
        let record_id = record.id;
        let mut units = vec![TranslationUnit::new(&mut ids, "Counter.java").with_record(record)];

        resolve(&mut units);
        let slots = reference_slots(&units[0], use_id).unwrap();
        assert_eq!(slots.resolved, Some(Resolution::new(field_id, BindingKind::Field)));
        assert_eq!(slots.implicit_base, Some(Resolution::new(record_id, BindingKind::This)));
    }

    #[test]
    fn block_local_is_visible_only_after_its_declaration() {
        let mut ids = NodeIdGen::new();
        let early =
            Expression::Reference(Reference::new(&mut ids, "x").with_span(Span::new(10, 11)));
        let late =
            Expression::Reference(Reference::new(&mut ids, "x").with_span(Span::new(40, 41)));
        let (early_id, late_id) = (reference_id(&early), reference_id(&late));
        let local =
            LocalDecl::new(&mut ids, "x", TypeRef::named("int")).with_span(Span::new(20, 30));
        let local_id = local.id;
        let field = FieldDecl::new(&mut ids, "x", TypeRef::named("int"));
        let field_id = field.id;
        let body =
            Block::new(&mut ids, vec![expr_stmt(early), Statement::Local(local), expr_stmt(late)]);
        let record = RecordDecl::new(&mut ids, "R")
            .with_field(field)
            .with_method(MethodDecl::new(&mut ids, "f", body));
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        resolve(&mut units);
        let early = reference_slots(&units[0], early_id).unwrap();
        let late = reference_slots(&units[0], late_id).unwrap();
        assert_eq!(early.resolved.map(|r| r.target), Some(field_id));
        assert_eq!(late.resolved.map(|r| r.target), Some(local_id));
    }

    #[test]
    fn instance_field_from_static_method_warns() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "count");
        let use_id = reference_id(&use_site);
        let field = FieldDecl::new(&mut ids, "count", TypeRef::named("int"));
        let field_id = field.id;
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "main", body)
            .static_method();
        let record = RecordDecl::new(&mut ids, "App").with_field(field).with_method(method);
        let record_id = record.id;
        let mut units = vec![TranslationUnit::new(&mut ids, "App.java").with_record(record)];

        let analysis = resolve(&mut units);
        let slots = reference_slots(&units[0], use_id).unwrap();
        assert_eq!(slots.resolved.map(|r| r.target), Some(field_id));
        assert_eq!(slots.implicit_base, Some(Resolution::new(record_id, BindingKind::Record)));
        assert!(matches!(
            analysis[0].issues.as_slice(),
            [ResolveError { kind: ResolveErrorKind::StaticContext { .. }, .. }]
        ));
    }

    #[test]
    fn static_field_from_static_method_is_clean() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "TOTAL");
        let use_id = reference_id(&use_site);
        let field = FieldDecl::new(&mut ids, "TOTAL", TypeRef::named("int")).static_field();
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "main", body)
            .static_method();
        let record = RecordDecl::new(&mut ids, "App").with_field(field).with_method(method);
        let mut units = vec![TranslationUnit::new(&mut ids, "App.java").with_record(record)];

        let analysis = resolve(&mut units);
        let slots = reference_slots(&units[0], use_id).unwrap();
        assert_eq!(slots.resolved.map(|r| r.kind), Some(BindingKind::StaticField));
        assert_eq!(slots.implicit_base.map(|r| r.kind), Some(BindingKind::Record));
        assert!(analysis[0].issues.is_empty());
    }

    #[test]
    fn unknown_name_stays_unresolved_and_is_reported_on_request() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "System");
        let use_id = reference_id(&use_site);
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "f", body);
        let record = RecordDecl::new(&mut ids, "R").with_method(method);
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let quiet = resolve(&mut units);
        assert!(quiet[0].issues.is_empty());
        assert_eq!(reference_slots(&units[0], use_id).unwrap().resolved, None);

        let options = ResolveOptions {
            report_unresolved: true,
            ..ResolveOptions::default()
        };
        let loud = resolve_with(&mut units, &options);
        assert!(matches!(
            &loud[0].issues[0].kind,
            ResolveErrorKind::UnresolvedReference {
                name,
                reason: UnresolvedReason::NoBinding,
            } if *name == "System"
        ));
    }

    #[test]
    fn inherited_field_through_this() {
        let mut ids = NodeIdGen::new();
        let inherited = FieldDecl::new(&mut ids, "size", TypeRef::named("int"));
        let inherited_id = inherited.id;
        let base = RecordDecl::new(&mut ids, "Shape").with_field(inherited);
        let use_site = Expression::reference(&mut ids, "size");
        let use_id = reference_id(&use_site);
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "area", body);
        let derived = RecordDecl::new(&mut ids, "Square")
            .extends(TypeRef::named("Shape"))
            .with_method(method);
        let derived_id = derived.id;
        let mut units = vec![
            TranslationUnit::new(&mut ids, "Shape.java").with_record(base),
            TranslationUnit::new(&mut ids, "Square.java").with_record(derived),
        ];

        resolve(&mut units);
        let slots = reference_slots(&units[1], use_id).unwrap();
        assert_eq!(slots.resolved, Some(Resolution::new(inherited_id, BindingKind::Field)));
        assert_eq!(slots.implicit_base, Some(Resolution::new(derived_id, BindingKind::This)));
    }

    #[test]
    fn static_initializer_has_no_receiver() {
        let mut ids = NodeIdGen::new();
        let init = Expression::reference(&mut ids, "seed");
        let init_id = reference_id(&init);
        let seed = FieldDecl::new(&mut ids, "seed", TypeRef::named("int"));
        let copy = FieldDecl::new(&mut ids, "copy", TypeRef::named("int"))
            .static_field()
            .with_initializer(init);
        let record = RecordDecl::new(&mut ids, "R").with_field(seed).with_field(copy);
        let mut units = vec![TranslationUnit::new(&mut ids, "R.java").with_record(record)];

        let analysis = resolve(&mut units);
        let slots = reference_slots(&units[0], init_id).unwrap();
        assert_eq!(slots.implicit_base.map(|r| r.kind), Some(BindingKind::Record));
        assert_eq!(analysis[0].issues.len(), 1);
    }

    #[test]
    fn empty_reference_name_aborts_unit() {
        let mut ids = NodeIdGen::new();
        let use_site = Expression::reference(&mut ids, "");
        let body = Block::new(&mut ids, vec![expr_stmt(use_site)]);
        let method = MethodDecl::new(&mut ids, "f", body);
        let record = RecordDecl::new(&mut ids, "R").with_method(method);
        let unit = TranslationUnit::new(&mut ids, "R.java").with_record(record);
        let index = RecordIndex::build(std::slice::from_ref(&unit));
        let err = crate::semantic_analysis::resolve_unit(&unit, &index, &ResolveOptions::default())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    fn reference_id(expr: &Expression) -> NodeId {
        match expr {
            Expression::Reference(reference) => reference.id,
            _ => panic!("not a reference"),
        }
    }
}
