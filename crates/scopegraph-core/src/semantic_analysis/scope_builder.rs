// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope tree construction (phase 1).
//!
//! One depth-first walk over a [`TranslationUnit`] that opens a scope for every
//! record, method, block, loop and catch clause and attaches it to the node
//! that opened it. Every loop statement gets its own Loop scope, so sibling
//! loops declaring the same variable never share a binding. A loop or catch
//! body written as a block gets a Block scope nested inside the Loop/Catch
//! scope.
//!
//! No bindings are created here; see [`super::declarations`].

use crate::ast::{Block, MethodDecl, NodeId, RecordDecl, Statement, TranslationUnit};
use crate::semantic_analysis::error::ResolveError;
use crate::semantic_analysis::record_index::{local_record_name, qualify};
use crate::semantic_analysis::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::source_analysis::Span;
use ecow::EcoString;
use tracing::trace;

/// Builds the scope tree of `unit`.
///
/// # Errors
///
/// Returns [`MalformedScopeNesting`](super::ResolveErrorKind::MalformedScopeNesting)
/// if a node would own two scopes, a record has no name, or the enter/exit
/// sequence does not balance.
pub fn build_scope_tree(unit: &TranslationUnit) -> Result<ScopeTree, ResolveError> {
    let mut builder = ScopeBuilder::new(unit.id);
    for record in &unit.records {
        builder.visit_record(record, qualify(unit.package.as_deref(), &record.name))?;
    }
    builder.finish(unit.span)
}

#[derive(Debug)]
struct ScopeBuilder {
    tree: ScopeTree,
    stack: Vec<ScopeId>,
}

impl ScopeBuilder {
    fn new(unit: NodeId) -> Self {
        Self {
            tree: ScopeTree::new(unit),
            stack: vec![ScopeId::GLOBAL],
        }
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    fn enter(
        &mut self,
        kind: ScopeKind,
        owner: NodeId,
        span: Span,
    ) -> Result<ScopeId, ResolveError> {
        let parent = self.current();
        let id = self.tree.add_scope(parent, kind, owner).map_err(|existing| {
            ResolveError::malformed(format!("node {owner} already owns {existing}"), span)
        })?;
        trace!(scope = %id, ?kind, %owner, %parent, "enter scope");
        self.stack.push(id);
        Ok(id)
    }

    fn exit(&mut self, owner: NodeId, span: Span) -> Result<(), ResolveError> {
        let top = self
            .stack
            .last()
            .copied()
            .filter(|&id| id != ScopeId::GLOBAL);
        match top {
            Some(id) if self.tree.scope(id).owner == owner => {
                self.stack.pop();
                Ok(())
            }
            _ => Err(ResolveError::malformed(
                format!("scope exit for {owner} without a matching enter"),
                span,
            )),
        }
    }

    fn finish(self, span: Span) -> Result<ScopeTree, ResolveError> {
        if self.stack.len() != 1 {
            return Err(ResolveError::malformed(
                format!("{} scope(s) left open", self.stack.len() - 1),
                span,
            ));
        }
        Ok(self.tree)
    }

    /// Opens the scope of `record`, known by the qualified name `name`.
    fn visit_record(&mut self, record: &RecordDecl, name: EcoString) -> Result<(), ResolveError> {
        if record.name.is_empty() {
            return Err(ResolveError::malformed("record without a name", record.span));
        }
        let id = self.enter(ScopeKind::Record, record.id, record.span)?;
        {
            let scope = self.tree.scope_mut(id);
            scope.is_static = record.is_static;
            scope.record = Some(name.clone());
        }
        for method in &record.methods {
            self.visit_method(method)?;
        }
        for nested in &record.records {
            self.visit_record(nested, qualify(Some(&name), &nested.name))?;
        }
        self.exit(record.id, record.span)
    }

    fn visit_method(&mut self, method: &MethodDecl) -> Result<(), ResolveError> {
        let id = self.enter(ScopeKind::Method, method.id, method.span)?;
        self.tree.scope_mut(id).is_static = method.is_static;
        if let Some(body) = &method.body {
            self.visit_block(body)?;
        }
        self.exit(method.id, method.span)
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), ResolveError> {
        self.enter(ScopeKind::Block, block.id, block.span)?;
        for stmt in &block.statements {
            self.visit_statement(stmt)?;
        }
        self.exit(block.id, block.span)
    }

    fn visit_statement(&mut self, stmt: &Statement) -> Result<(), ResolveError> {
        match stmt {
            Statement::Block(block) => self.visit_block(block),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.visit_statement(else_branch)?;
                }
                Ok(())
            }
            Statement::For(for_loop) => {
                self.enter(ScopeKind::Loop, for_loop.id, for_loop.span)?;
                for init in &for_loop.init {
                    self.visit_statement(init)?;
                }
                self.visit_statement(&for_loop.body)?;
                self.exit(for_loop.id, for_loop.span)
            }
            Statement::ForEach(for_each) => {
                self.enter(ScopeKind::Loop, for_each.id, for_each.span)?;
                self.visit_statement(&for_each.body)?;
                self.exit(for_each.id, for_each.span)
            }
            Statement::While(while_loop) => {
                self.enter(ScopeKind::Loop, while_loop.id, while_loop.span)?;
                self.visit_statement(&while_loop.body)?;
                self.exit(while_loop.id, while_loop.span)
            }
            Statement::Try(try_stmt) => {
                self.visit_block(&try_stmt.body)?;
                for catch in &try_stmt.catches {
                    self.enter(ScopeKind::Catch, catch.id, catch.span)?;
                    self.visit_block(&catch.body)?;
                    self.exit(catch.id, catch.span)?;
                }
                if let Some(finally) = &try_stmt.finally {
                    self.visit_block(finally)?;
                }
                Ok(())
            }
            Statement::Record(record) => {
                let enclosing = self
                    .tree
                    .enclosing_record(self.current())
                    .and_then(|id| self.tree.scope(id).record.clone());
                self.visit_record(record, local_record_name(enclosing.as_deref(), record))
            }
            Statement::Local(_) | Statement::Expression(_) | Statement::Return { .. } => Ok(()),
        }
    }
}
