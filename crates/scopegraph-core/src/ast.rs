// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree consumed by the resolver.
//!
//! The front end hands over one [`TranslationUnit`] per source file. The tree
//! models an object-oriented language with classes (records), fields, methods,
//! blocks, loops and exception handlers.
//!
//! # Identity
//!
//! Every node that can open a scope, introduce a name, or refer to one carries
//! a [`NodeId`]. Ids must be unique across all units analysed together, because
//! a resolved slot may point at a field declared in another unit.
//!
//! # Resolved slots
//!
//! [`Reference`] and [`MemberAccess`] carry a `resolved` slot that starts out
//! empty. The resolver writes a [`Resolution`] into it, or leaves it empty to
//! signal an unresolved (likely external) symbol. A bare [`Reference`] that
//! turns out to be a field access additionally gets its synthesized receiver
//! written into `implicit_base`. These slots are the only part of the tree the
//! resolver mutates.
//!
//! # Example
//!
//! ```
//! use scopegraph_core::ast::{
//!     Block, Expression, FieldDecl, MethodDecl, NodeIdGen, RecordDecl, Statement,
//!     TranslationUnit, TypeRef,
//! };
//!
//! let mut ids = NodeIdGen::new();
//! let use_site = Expression::reference(&mut ids, "count");
//! let body = Block::new(&mut ids, vec![Statement::Expression(use_site)]);
//! let method = MethodDecl::new(&mut ids, "get", body);
//! let field = FieldDecl::new(&mut ids, "count", TypeRef::named("int"));
//! let record = RecordDecl::new(&mut ids, "Counter")
//!     .with_field(field)
//!     .with_method(method);
//! let unit = TranslationUnit::new(&mut ids, "Counter.java").with_record(record);
//! assert_eq!(unit.records[0].fields[0].name, "count");
//! ```

use crate::semantic_analysis::BindingKind;
use crate::source_analysis::Span;
use camino::Utf8PathBuf;
use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an AST node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh [`NodeId`]s for trees built in code.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next_id: u32,
}

impl NodeIdGen {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Continues numbering after `start`, so ids do not collide with an
    /// already-numbered tree.
    #[must_use]
    pub fn starting_at(start: u32) -> Self {
        Self { next_id: start }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// What a resolved slot points at.
///
/// `target` is the declaration's node id. `kind` says how it was reached: a
/// record reached through `this` carries [`BindingKind::This`], the same record
/// named explicitly carries [`BindingKind::Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub target: NodeId,
    pub kind: BindingKind,
}

impl Resolution {
    #[must_use]
    pub const fn new(target: NodeId, kind: BindingKind) -> Self {
        Self { target, kind }
    }
}

/// A nominal type as written at a declaration site (e.g. `ExternalClass`,
/// `variables.ExternalClass`, `int`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: EcoString,
    #[serde(default)]
    pub span: Span,
}

impl TypeRef {
    pub fn named(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
        }
    }
}

/// One source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub id: NodeId,
    pub name: EcoString,
    /// Location of the source file, used for rendering diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<EcoString>,
    /// Imported names; `a.b.*` imports every record of package `a.b`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<EcoString>,
    #[serde(default)]
    pub records: Vec<RecordDecl>,
    #[serde(default)]
    pub span: Span,
}

impl TranslationUnit {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            path: None,
            package: None,
            imports: Vec::new(),
            records: Vec::new(),
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<EcoString>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn with_import(mut self, import: impl Into<EcoString>) -> Self {
        self.imports.push(import.into());
        self
    }

    #[must_use]
    pub fn with_record(mut self, record: RecordDecl) -> Self {
        self.records.push(record);
        self
    }
}

/// A class-like declaration: fields, methods and nested records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub id: NodeId,
    /// Simple (unqualified) name.
    pub name: EcoString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    /// A statically nested record has no implicit outer instance.
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub records: Vec<RecordDecl>,
    #[serde(default)]
    pub span: Span,
}

impl RecordDecl {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            superclass: None,
            is_static: false,
            fields: Vec::new(),
            methods: Vec::new(),
            records: Vec::new(),
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    #[must_use]
    pub fn static_nested(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_record(mut self, record: RecordDecl) -> Self {
        self.records.push(record);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: NodeId,
    pub name: EcoString,
    pub ty: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub span: Span,
}

impl FieldDecl {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>, ty: TypeRef) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            ty,
            is_static: false,
            initializer: None,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: Expression) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: EcoString,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    /// `None` for abstract and native methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Block>,
    #[serde(default)]
    pub span: Span,
}

impl MethodDecl {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>, body: Block) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            is_static: false,
            is_constructor: false,
            parameters: Vec::new(),
            body: Some(body),
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParamDecl) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub id: NodeId,
    pub name: EcoString,
    pub ty: TypeRef,
    #[serde(default)]
    pub span: Span,
}

impl ParamDecl {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>, ty: TypeRef) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            ty,
            span: Span::default(),
        }
    }
}

/// A local variable, loop variable, or caught-exception variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub id: NodeId,
    pub name: EcoString,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub span: Span,
}

impl LocalDecl {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>, ty: TypeRef) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            ty,
            initializer: None,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: Expression) -> Self {
        self.initializer = Some(initializer);
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// A `{ ... }` statement block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub span: Span,
}

impl Block {
    pub fn new(ids: &mut NodeIdGen, statements: Vec<Statement>) -> Self {
        Self {
            id: ids.next_id(),
            statements,
            span: Span::default(),
        }
    }
}

/// `for (init; condition; update) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    pub id: NodeId,
    #[serde(default)]
    pub init: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expression>,
    #[serde(default)]
    pub update: Vec<Expression>,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: Span,
}

/// `for (Type variable : iterable) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachLoop {
    pub id: NodeId,
    pub variable: LocalDecl,
    pub iterable: Expression,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: Span,
}

/// `while (condition) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileLoop {
    pub id: NodeId,
    pub condition: Expression,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStatement {
    pub body: Block,
    #[serde(default)]
    pub catches: Vec<CatchClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finally: Option<Block>,
    #[serde(default)]
    pub span: Span,
}

/// `catch (Type parameter) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub id: NodeId,
    pub parameter: LocalDecl,
    #[serde(default)]
    pub exception_types: Vec<TypeRef>,
    pub body: Block,
    #[serde(default)]
    pub span: Span,
}

impl CatchClause {
    pub fn new(ids: &mut NodeIdGen, parameter: LocalDecl, body: Block) -> Self {
        let exception_types = vec![parameter.ty.clone()];
        Self {
            id: ids.next_id(),
            parameter,
            exception_types,
            body,
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    Local(LocalDecl),
    Expression(Expression),
    Block(Block),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<Statement>>,
        #[serde(default)]
        span: Span,
    },
    For(ForLoop),
    ForEach(ForEachLoop),
    While(WhileLoop),
    Try(TryStatement),
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expression>,
        #[serde(default)]
        span: Span,
    },
    /// A record declared inside a method body.
    Record(RecordDecl),
}

impl Statement {
    /// `for (init; ; ) body` with no condition or update.
    pub fn for_loop(ids: &mut NodeIdGen, init: Vec<Statement>, body: Statement) -> Self {
        Self::For(ForLoop {
            id: ids.next_id(),
            init,
            condition: None,
            update: Vec::new(),
            body: Box::new(body),
            span: Span::default(),
        })
    }

    pub fn for_each(
        ids: &mut NodeIdGen,
        variable: LocalDecl,
        iterable: Expression,
        body: Statement,
    ) -> Self {
        Self::ForEach(ForEachLoop {
            id: ids.next_id(),
            variable,
            iterable,
            body: Box::new(body),
            span: Span::default(),
        })
    }

    pub fn while_loop(ids: &mut NodeIdGen, condition: Expression, body: Statement) -> Self {
        Self::While(WhileLoop {
            id: ids.next_id(),
            condition,
            body: Box::new(body),
            span: Span::default(),
        })
    }

    #[must_use]
    pub fn try_catch(body: Block, catches: Vec<CatchClause>) -> Self {
        Self::Try(TryStatement {
            body,
            catches,
            finally: None,
            span: Span::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    String(EcoString),
    Boolean(bool),
    Char(char),
    Null,
}

/// A bare name used as an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: NodeId,
    pub name: EcoString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Resolution>,
    /// Receiver synthesized when the name turned out to be a field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit_base: Option<Resolution>,
    #[serde(default)]
    pub span: Span,
}

impl Reference {
    pub fn new(ids: &mut NodeIdGen, name: impl Into<EcoString>) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            resolved: None,
            implicit_base: None,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// `base.member`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    pub id: NodeId,
    pub base: Box<Expression>,
    pub member: EcoString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Resolution>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expression {
    Literal {
        value: Literal,
        #[serde(default)]
        span: Span,
    },
    Reference(Reference),
    Member(MemberAccess),
    /// A method call; the callee itself is not resolved here.
    Call {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<Box<Expression>>,
        name: EcoString,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        span: Span,
    },
    New {
        ty: TypeRef,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        span: Span,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
    Binary {
        operator: EcoString,
        left: Box<Expression>,
        right: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
    Unary {
        operator: EcoString,
        operand: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
    Cast {
        ty: TypeRef,
        expression: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
}

impl Expression {
    pub fn reference(ids: &mut NodeIdGen, name: impl Into<EcoString>) -> Self {
        Self::Reference(Reference::new(ids, name))
    }

    pub fn member(ids: &mut NodeIdGen, base: Expression, member: impl Into<EcoString>) -> Self {
        Self::Member(MemberAccess {
            id: ids.next_id(),
            base: Box::new(base),
            member: member.into(),
            resolved: None,
            span: Span::default(),
        })
    }

    pub fn call(name: impl Into<EcoString>, arguments: Vec<Expression>) -> Self {
        Self::Call {
            receiver: None,
            name: name.into(),
            arguments,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn new_instance(ty: TypeRef, arguments: Vec<Expression>) -> Self {
        Self::New {
            ty,
            arguments,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Literal {
            value: Literal::Integer(value),
            span: Span::default(),
        }
    }

    pub fn string(value: impl Into<EcoString>) -> Self {
        Self::Literal {
            value: Literal::String(value.into()),
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn assign(target: Expression, value: Expression) -> Self {
        Self::Assign {
            target: Box::new(target),
            value: Box::new(value),
            span: Span::default(),
        }
    }

    /// Source location of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Reference(reference) => reference.span,
            Self::Member(access) => access.span,
            Self::Literal { span, .. }
            | Self::Call { span, .. }
            | Self::New { span, .. }
            | Self::Assign { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Cast { span, .. }
            | Self::Index { span, .. } => *span,
        }
    }

    /// The resolved slot of a reference or member access, if this is one.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            Self::Reference(reference) => reference.resolved,
            Self::Member(access) => access.resolved,
            _ => None,
        }
    }

    /// The dotted path spelled by a chain of bare names and member accesses
    /// (`a.b.c`), or `None` if anything else appears in the chain.
    #[must_use]
    pub fn dotted_path(&self) -> Option<EcoString> {
        match self {
            Self::Reference(reference) => Some(reference.name.clone()),
            Self::Member(access) => {
                let mut path = access.base.dotted_path()?;
                path.push('.');
                path.push_str(&access.member);
                Some(path)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_gen_is_sequential() {
        let mut ids = NodeIdGen::starting_at(10);
        assert_eq!(ids.next_id(), NodeId(10));
        assert_eq!(ids.next_id(), NodeId(11));
    }

    #[test]
    fn dotted_path_of_member_chain() {
        let mut ids = NodeIdGen::new();
        let pkg = Expression::reference(&mut ids, "variables");
        let ty = Expression::member(&mut ids, pkg, "ExternalClass");
        let field = Expression::member(&mut ids, ty, "staticVarName");
        assert_eq!(
            field.dotted_path().as_deref(),
            Some("variables.ExternalClass.staticVarName")
        );
    }

    #[test]
    fn dotted_path_stops_at_calls() {
        let mut ids = NodeIdGen::new();
        let call = Expression::call("make", vec![]);
        let access = Expression::member(&mut ids, call, "x");
        assert_eq!(access.dotted_path(), None);
    }

    #[test]
    fn unit_round_trips_through_json() {
        let mut ids = NodeIdGen::new();
        let local = LocalDecl::new(&mut ids, "x", TypeRef::named("int"))
            .with_initializer(Expression::int(1));
        let use_x = Expression::reference(&mut ids, "x");
        let body = Block::new(
            &mut ids,
            vec![Statement::Local(local), Statement::Expression(use_x)],
        );
        let method = MethodDecl::new(&mut ids, "f", body);
        let record = RecordDecl::new(&mut ids, "A").with_method(method);
        let unit = TranslationUnit::new(&mut ids, "A.java")
            .with_package("p")
            .with_record(record);

        let json = serde_json::to_string(&unit).unwrap();
        let decoded: TranslationUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, unit);
    }

    #[test]
    fn unresolved_slots_are_omitted_from_json() {
        let mut ids = NodeIdGen::new();
        let expr = Expression::reference(&mut ids, "x");
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["expr"], "reference");
        assert!(json.get("resolved").is_none());
    }
}
