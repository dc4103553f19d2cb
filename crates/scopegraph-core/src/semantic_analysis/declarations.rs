// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration registration (phase 2).
//!
//! Walks the unit a second time and binds every declared name into the scope
//! that syntactically owns it:
//! - fields, nested record names, `this` and `Outer.this` → the Record scope
//! - parameters → the Method scope
//! - loop variables → the Loop scope
//! - caught variables → the Catch scope
//! - locals and local record names → the enclosing Block scope
//! - top-level record names → Global
//!
//! A second declaration of a name in the same scope is reported and dropped;
//! the first one stays bound. Every declaration, bound or not, is recorded in
//! the [`DeclTable`].

use crate::ast::{Block, LocalDecl, MethodDecl, NodeId, RecordDecl, Statement, TranslationUnit};
use crate::semantic_analysis::error::ResolveError;
use crate::semantic_analysis::scope::{Binding, BindingKind, ScopeId, ScopeKind, ScopeTree};
use crate::source_analysis::Span;
use ecow::EcoString;
use std::collections::HashMap;
use tracing::trace;

/// What a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Field,
    Parameter,
    Local,
    CatchParameter,
    Record,
}

/// A declaration as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: NodeId,
    pub name: EcoString,
    pub kind: DeclKind,
    /// Type name as written; the qualified name for records.
    pub declared_type: Option<EcoString>,
    /// Static fields and static nested records.
    pub is_static: bool,
    /// The scope the name is bound in.
    pub scope: ScopeId,
    pub span: Span,
}

/// All declarations of one unit, keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct DeclTable {
    decls: HashMap<NodeId, Declaration>,
}

impl DeclTable {
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Declaration> {
        self.decls.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.values()
    }

    fn insert(&mut self, decl: Declaration) -> Result<(), ResolveError> {
        if self.decls.contains_key(&decl.id) {
            return Err(ResolveError::malformed(
                format!("node {} declares more than one name", decl.id),
                decl.span,
            ));
        }
        self.decls.insert(decl.id, decl);
        Ok(())
    }
}

/// Populates `tree` with the bindings of `unit`.
///
/// Returns the declaration table together with the recoverable issues
/// (duplicate declarations).
///
/// # Errors
///
/// Returns [`MalformedScopeNesting`](super::ResolveErrorKind::MalformedScopeNesting)
/// if a declaration has no name, a node id is reused by two declarations, or
/// a scope-opening node has no scope in `tree`.
pub fn register_declarations(
    unit: &TranslationUnit,
    tree: &mut ScopeTree,
) -> Result<(DeclTable, Vec<ResolveError>), ResolveError> {
    let mut registrar = DeclarationRegistrar {
        tree,
        table: DeclTable::default(),
        issues: Vec::new(),
    };
    for record in &unit.records {
        registrar.register_record(record, ScopeId::GLOBAL)?;
    }
    Ok((registrar.table, registrar.issues))
}

struct DeclarationRegistrar<'a> {
    tree: &'a mut ScopeTree,
    table: DeclTable,
    issues: Vec<ResolveError>,
}

impl DeclarationRegistrar<'_> {
    fn scope_of(&self, owner: NodeId, span: Span) -> Result<ScopeId, ResolveError> {
        self.tree
            .scope_of(owner)
            .ok_or_else(|| ResolveError::malformed(format!("no scope opened by {owner}"), span))
    }

    /// Records `decl` and binds it into its scope, reporting a duplicate name.
    fn declare(&mut self, decl: Declaration, kind: BindingKind) -> Result<(), ResolveError> {
        if decl.name.is_empty() {
            return Err(ResolveError::malformed(
                format!("declaration {} without a name", decl.id),
                decl.span,
            ));
        }
        let binding = Binding {
            name: decl.name.clone(),
            target: decl.id,
            kind,
            defined_at: decl.span,
        };
        let (scope, name, span) = (decl.scope, decl.name.clone(), decl.span);
        self.table.insert(decl)?;
        match self.tree.declare(scope, binding) {
            Ok(()) => trace!(%name, %kind, %scope, "bind"),
            Err(first) => self
                .issues
                .push(ResolveError::duplicate(name, first.defined_at, span)),
        }
        Ok(())
    }

    /// Binds a synthetic receiver. Receivers never collide with declared
    /// names, so a clash means an identically named enclosing record and the
    /// nearer binding is kept.
    fn declare_receiver(
        &mut self,
        scope: ScopeId,
        name: EcoString,
        target: NodeId,
        defined_at: Span,
        kind: BindingKind,
    ) {
        let binding = Binding {
            name,
            target,
            kind,
            defined_at,
        };
        if let Err(kept) = self.tree.declare(scope, binding) {
            trace!(name = %kept.name, %scope, "receiver already bound");
        }
    }

    fn register_record(
        &mut self,
        record: &RecordDecl,
        parent: ScopeId,
    ) -> Result<(), ResolveError> {
        let scope = self.scope_of(record.id, record.span)?;
        let qualified = self.tree.scope(scope).record.clone();
        self.declare(
            Declaration {
                id: record.id,
                name: record.name.clone(),
                kind: DeclKind::Record,
                declared_type: qualified,
                is_static: record.is_static,
                scope: parent,
                span: record.span,
            },
            BindingKind::Record,
        )?;

        self.declare_receiver(scope, "this".into(), record.id, record.span, BindingKind::This);
        self.register_outer_receivers(scope, record);

        for field in &record.fields {
            let kind = if field.is_static {
                BindingKind::StaticField
            } else {
                BindingKind::Field
            };
            self.declare(
                Declaration {
                    id: field.id,
                    name: field.name.clone(),
                    kind: DeclKind::Field,
                    declared_type: Some(field.ty.name.clone()),
                    is_static: field.is_static,
                    scope,
                    span: field.span,
                },
                kind,
            )?;
        }
        for nested in &record.records {
            self.register_record(nested, scope)?;
        }
        for method in &record.methods {
            self.register_method(method)?;
        }
        Ok(())
    }

    /// Binds `Outer.this` for every enclosing record whose instance is
    /// reachable from `record`: one per level, stopping after a static record
    /// or at a static method.
    fn register_outer_receivers(&mut self, scope: ScopeId, record: &RecordDecl) {
        if record.is_static {
            return;
        }
        let mut outers = Vec::new();
        let mut current = self.tree.scope(scope).parent;
        while let Some(id) = current {
            let s = self.tree.scope(id);
            match s.kind {
                ScopeKind::Method if s.is_static => break,
                ScopeKind::Record => {
                    outers.push(s.owner);
                    if s.is_static {
                        break;
                    }
                }
                _ => {}
            }
            current = s.parent;
        }
        for owner in outers {
            let Some(outer) = self.table.get(owner) else {
                continue;
            };
            let name = EcoString::from(format!("{}.this", outer.name));
            let defined_at = outer.span;
            self.declare_receiver(scope, name, owner, defined_at, BindingKind::OuterThis);
        }
    }

    fn register_method(&mut self, method: &MethodDecl) -> Result<(), ResolveError> {
        let scope = self.scope_of(method.id, method.span)?;
        for param in &method.parameters {
            self.declare(
                Declaration {
                    id: param.id,
                    name: param.name.clone(),
                    kind: DeclKind::Parameter,
                    declared_type: Some(param.ty.name.clone()),
                    is_static: false,
                    scope,
                    span: param.span,
                },
                BindingKind::Parameter,
            )?;
        }
        if let Some(body) = &method.body {
            self.register_block(body)?;
        }
        Ok(())
    }

    fn register_block(&mut self, block: &Block) -> Result<(), ResolveError> {
        let scope = self.scope_of(block.id, block.span)?;
        for stmt in &block.statements {
            self.register_statement(stmt, scope)?;
        }
        Ok(())
    }

    fn register_local(
        &mut self,
        local: &LocalDecl,
        scope: ScopeId,
        kind: DeclKind,
    ) -> Result<(), ResolveError> {
        self.declare(
            Declaration {
                id: local.id,
                name: local.name.clone(),
                kind,
                declared_type: Some(local.ty.name.clone()),
                is_static: false,
                scope,
                span: local.span,
            },
            BindingKind::Local,
        )
    }

    fn register_statement(&mut self, stmt: &Statement, scope: ScopeId) -> Result<(), ResolveError> {
        match stmt {
            Statement::Local(local) => self.register_local(local, scope, DeclKind::Local),
            Statement::Block(block) => self.register_block(block),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.register_statement(then_branch, scope)?;
                if let Some(else_branch) = else_branch {
                    self.register_statement(else_branch, scope)?;
                }
                Ok(())
            }
            Statement::For(for_loop) => {
                let loop_scope = self.scope_of(for_loop.id, for_loop.span)?;
                for init in &for_loop.init {
                    self.register_statement(init, loop_scope)?;
                }
                self.register_statement(&for_loop.body, loop_scope)
            }
            Statement::ForEach(for_each) => {
                let loop_scope = self.scope_of(for_each.id, for_each.span)?;
                self.register_local(&for_each.variable, loop_scope, DeclKind::Local)?;
                self.register_statement(&for_each.body, loop_scope)
            }
            Statement::While(while_loop) => {
                let loop_scope = self.scope_of(while_loop.id, while_loop.span)?;
                self.register_statement(&while_loop.body, loop_scope)
            }
            Statement::Try(try_stmt) => {
                self.register_block(&try_stmt.body)?;
                for catch in &try_stmt.catches {
                    let catch_scope = self.scope_of(catch.id, catch.span)?;
                    self.register_local(&catch.parameter, catch_scope, DeclKind::CatchParameter)?;
                    self.register_block(&catch.body)?;
                }
                if let Some(finally) = &try_stmt.finally {
                    self.register_block(finally)?;
                }
                Ok(())
            }
            Statement::Record(record) => self.register_record(record, scope),
            Statement::Expression(_) | Statement::Return { .. } => Ok(()),
        }
    }
}
