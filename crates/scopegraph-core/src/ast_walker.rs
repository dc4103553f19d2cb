// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared AST walkers.
//!
//! - [`walk_expression`] / [`walk_expression_mut`]: pre-order recursive walk
//!   of one expression tree, calling a visitor on every node.
//! - [`walk_statement`] / [`walk_statement_mut`]: every expression reachable
//!   from a statement, including nested blocks, loops, catch clauses and
//!   local records.
//! - [`for_each_expression`] / [`for_each_expression_mut`]: every expression
//!   in a translation unit (field initializers and method bodies, nested
//!   records included).
//! - [`local_records`]: records declared inside a method body.
//!
//! Passes that need to know which scope they are in (registration,
//! resolution) keep their own recursion; these walkers serve the passes that
//! only need to see every node, such as writing resolved slots back.

use crate::ast::{Expression, RecordDecl, Statement, TranslationUnit};

// ── Expression walkers ────────────────────────────────────────────────────────

/// Recursively walks an expression tree in pre-order, calling `f` on every node.
pub fn walk_expression<F>(expr: &Expression, f: &mut F)
where
    F: FnMut(&Expression),
{
    f(expr);
    match expr {
        Expression::Member(access) => walk_expression(&access.base, f),
        Expression::Call {
            receiver,
            arguments,
            ..
        } => {
            if let Some(receiver) = receiver {
                walk_expression(receiver, f);
            }
            for arg in arguments {
                walk_expression(arg, f);
            }
        }
        Expression::New { arguments, .. } => {
            for arg in arguments {
                walk_expression(arg, f);
            }
        }
        Expression::Assign { target, value, .. } => {
            walk_expression(target, f);
            walk_expression(value, f);
        }
        Expression::Binary { left, right, .. } => {
            walk_expression(left, f);
            walk_expression(right, f);
        }
        Expression::Unary { operand, .. } => walk_expression(operand, f),
        Expression::Cast { expression, .. } => walk_expression(expression, f),
        Expression::Index { target, index, .. } => {
            walk_expression(target, f);
            walk_expression(index, f);
        }
        // Leaf nodes
        Expression::Literal { .. } | Expression::Reference(..) => {}
    }
}

/// Mutable counterpart of [`walk_expression`].
pub fn walk_expression_mut<F>(expr: &mut Expression, f: &mut F)
where
    F: FnMut(&mut Expression),
{
    f(expr);
    match expr {
        Expression::Member(access) => walk_expression_mut(&mut access.base, f),
        Expression::Call {
            receiver,
            arguments,
            ..
        } => {
            if let Some(receiver) = receiver {
                walk_expression_mut(receiver, f);
            }
            for arg in arguments {
                walk_expression_mut(arg, f);
            }
        }
        Expression::New { arguments, .. } => {
            for arg in arguments {
                walk_expression_mut(arg, f);
            }
        }
        Expression::Assign { target, value, .. } => {
            walk_expression_mut(target, f);
            walk_expression_mut(value, f);
        }
        Expression::Binary { left, right, .. } => {
            walk_expression_mut(left, f);
            walk_expression_mut(right, f);
        }
        Expression::Unary { operand, .. } => walk_expression_mut(operand, f),
        Expression::Cast { expression, .. } => walk_expression_mut(expression, f),
        Expression::Index { target, index, .. } => {
            walk_expression_mut(target, f);
            walk_expression_mut(index, f);
        }
        Expression::Literal { .. } | Expression::Reference(..) => {}
    }
}

// ── Statement walkers ─────────────────────────────────────────────────────────

/// Walks every expression reachable from `stmt`, in source order.
pub fn walk_statement<F>(stmt: &Statement, f: &mut F)
where
    F: FnMut(&Expression),
{
    match stmt {
        Statement::Local(local) => {
            if let Some(init) = &local.initializer {
                walk_expression(init, f);
            }
        }
        Statement::Expression(expr) => walk_expression(expr, f),
        Statement::Block(block) => {
            for s in &block.statements {
                walk_statement(s, f);
            }
        }
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expression(condition, f);
            walk_statement(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk_statement(else_branch, f);
            }
        }
        Statement::For(for_loop) => {
            for s in &for_loop.init {
                walk_statement(s, f);
            }
            if let Some(condition) = &for_loop.condition {
                walk_expression(condition, f);
            }
            for update in &for_loop.update {
                walk_expression(update, f);
            }
            walk_statement(&for_loop.body, f);
        }
        Statement::ForEach(for_each) => {
            if let Some(init) = &for_each.variable.initializer {
                walk_expression(init, f);
            }
            walk_expression(&for_each.iterable, f);
            walk_statement(&for_each.body, f);
        }
        Statement::While(while_loop) => {
            walk_expression(&while_loop.condition, f);
            walk_statement(&while_loop.body, f);
        }
        Statement::Try(try_stmt) => {
            for s in &try_stmt.body.statements {
                walk_statement(s, f);
            }
            for catch in &try_stmt.catches {
                for s in &catch.body.statements {
                    walk_statement(s, f);
                }
            }
            if let Some(finally) = &try_stmt.finally {
                for s in &finally.statements {
                    walk_statement(s, f);
                }
            }
        }
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                walk_expression(value, f);
            }
        }
        Statement::Record(record) => walk_record(record, f),
    }
}

/// Mutable counterpart of [`walk_statement`].
pub fn walk_statement_mut<F>(stmt: &mut Statement, f: &mut F)
where
    F: FnMut(&mut Expression),
{
    match stmt {
        Statement::Local(local) => {
            if let Some(init) = &mut local.initializer {
                walk_expression_mut(init, f);
            }
        }
        Statement::Expression(expr) => walk_expression_mut(expr, f),
        Statement::Block(block) => {
            for s in &mut block.statements {
                walk_statement_mut(s, f);
            }
        }
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expression_mut(condition, f);
            walk_statement_mut(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk_statement_mut(else_branch, f);
            }
        }
        Statement::For(for_loop) => {
            for s in &mut for_loop.init {
                walk_statement_mut(s, f);
            }
            if let Some(condition) = &mut for_loop.condition {
                walk_expression_mut(condition, f);
            }
            for update in &mut for_loop.update {
                walk_expression_mut(update, f);
            }
            walk_statement_mut(&mut for_loop.body, f);
        }
        Statement::ForEach(for_each) => {
            if let Some(init) = &mut for_each.variable.initializer {
                walk_expression_mut(init, f);
            }
            walk_expression_mut(&mut for_each.iterable, f);
            walk_statement_mut(&mut for_each.body, f);
        }
        Statement::While(while_loop) => {
            walk_expression_mut(&mut while_loop.condition, f);
            walk_statement_mut(&mut while_loop.body, f);
        }
        Statement::Try(try_stmt) => {
            for s in &mut try_stmt.body.statements {
                walk_statement_mut(s, f);
            }
            for catch in &mut try_stmt.catches {
                for s in &mut catch.body.statements {
                    walk_statement_mut(s, f);
                }
            }
            if let Some(finally) = &mut try_stmt.finally {
                for s in &mut finally.statements {
                    walk_statement_mut(s, f);
                }
            }
        }
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                walk_expression_mut(value, f);
            }
        }
        Statement::Record(record) => walk_record_mut(record, f),
    }
}

/// Calls `f` on every record declared directly in `statements` (at any block
/// depth), without descending into the records themselves.
pub fn local_records<F>(statements: &[Statement], f: &mut F)
where
    F: FnMut(&RecordDecl),
{
    for stmt in statements {
        match stmt {
            Statement::Record(record) => f(record),
            Statement::Block(block) => local_records(&block.statements, f),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                local_records(std::slice::from_ref(then_branch.as_ref()), f);
                if let Some(else_branch) = else_branch {
                    local_records(std::slice::from_ref(else_branch.as_ref()), f);
                }
            }
            Statement::For(for_loop) => {
                local_records(std::slice::from_ref(for_loop.body.as_ref()), f);
            }
            Statement::ForEach(for_each) => {
                local_records(std::slice::from_ref(for_each.body.as_ref()), f);
            }
            Statement::While(while_loop) => {
                local_records(std::slice::from_ref(while_loop.body.as_ref()), f);
            }
            Statement::Try(try_stmt) => {
                local_records(&try_stmt.body.statements, f);
                for catch in &try_stmt.catches {
                    local_records(&catch.body.statements, f);
                }
                if let Some(finally) = &try_stmt.finally {
                    local_records(&finally.statements, f);
                }
            }
            Statement::Local(_) | Statement::Expression(_) | Statement::Return { .. } => {}
        }
    }
}

// ── Unit-level iterators ──────────────────────────────────────────────────────

fn walk_record<F>(record: &RecordDecl, f: &mut F)
where
    F: FnMut(&Expression),
{
    for field in &record.fields {
        if let Some(init) = &field.initializer {
            walk_expression(init, f);
        }
    }
    for method in &record.methods {
        if let Some(body) = &method.body {
            for s in &body.statements {
                walk_statement(s, f);
            }
        }
    }
    for nested in &record.records {
        walk_record(nested, f);
    }
}

fn walk_record_mut<F>(record: &mut RecordDecl, f: &mut F)
where
    F: FnMut(&mut Expression),
{
    for field in &mut record.fields {
        if let Some(init) = &mut field.initializer {
            walk_expression_mut(init, f);
        }
    }
    for method in &mut record.methods {
        if let Some(body) = &mut method.body {
            for s in &mut body.statements {
                walk_statement_mut(s, f);
            }
        }
    }
    for nested in &mut record.records {
        walk_record_mut(nested, f);
    }
}

/// Calls `f` on every expression node in the unit (pre-order).
pub fn for_each_expression<F>(unit: &TranslationUnit, f: &mut F)
where
    F: FnMut(&Expression),
{
    for record in &unit.records {
        walk_record(record, f);
    }
}

/// Mutable counterpart of [`for_each_expression`].
pub fn for_each_expression_mut<F>(unit: &mut TranslationUnit, f: &mut F)
where
    F: FnMut(&mut Expression),
{
    for record in &mut unit.records {
        walk_record_mut(record, f);
    }
}
