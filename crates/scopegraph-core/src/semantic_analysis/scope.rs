// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scope tree.
//!
//! Scopes live in an arena owned by [`ScopeTree`] and refer to each other by
//! [`ScopeId`]. The nesting mirrors the syntax:
//! - Global (one per translation unit)
//! - Record (class body)
//! - Method (parameters)
//! - Block, Loop, Catch (locals)
//!
//! Each scope holds the [`Binding`]s registered into it, in two namespaces:
//! variables (fields, parameters, locals, receivers) and record names. A
//! name is unique within one namespace of one scope; the same name in a
//! nested scope shadows the outer one.

use crate::ast::NodeId;
use crate::source_analysis::Span;
use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Handle to a scope inside a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global scope of every tree.
    pub const GLOBAL: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// The syntactic construct that opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Record,
    Method,
    Block,
    Loop,
    Catch,
}

/// How a name was introduced.
///
/// Carried by every [`Binding`] and copied into resolved slots, so consumers
/// can tell a receiver (`This`, `OuterThis`) from a record named explicitly
/// (`Record`) even though all three point at a record declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Field,
    StaticField,
    Parameter,
    /// Local, loop or caught-exception variable.
    Local,
    /// Implicit `this` of a record.
    This,
    /// Implicit `Outer.this` of an enclosing record.
    OuterThis,
    Record,
}

impl BindingKind {
    /// True for the synthesized receiver bindings.
    #[must_use]
    pub fn is_receiver(self) -> bool {
        matches!(self, Self::This | Self::OuterThis)
    }

    /// True for instance and static fields.
    #[must_use]
    pub fn is_field(self) -> bool {
        matches!(self, Self::Field | Self::StaticField)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Field => "field",
            Self::StaticField => "static field",
            Self::Parameter => "parameter",
            Self::Local => "local",
            Self::This => "this",
            Self::OuterThis => "outer this",
            Self::Record => "record",
        };
        f.write_str(text)
    }
}

/// A name bound in exactly one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: EcoString,
    /// The declaration this name denotes. Receivers point at their record.
    pub target: NodeId,
    pub kind: BindingKind,
    pub defined_at: Span,
}

/// A node in the scope tree.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The AST node that opened this scope.
    pub owner: NodeId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Set on Method scopes of static methods and Record scopes of static
    /// nested records.
    pub is_static: bool,
    /// Qualified record name, on Record scopes only.
    pub record: Option<EcoString>,
    bindings: HashMap<EcoString, Binding>,
    types: HashMap<EcoString, Binding>,
}

impl Scope {
    /// Looks up a variable in this scope only.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Looks up a record name in this scope only.
    #[must_use]
    pub fn type_binding(&self, name: &str) -> Option<&Binding> {
        self.types.get(name)
    }

    /// Iterates over the variables, then the record names, of this scope.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values().chain(self.types.values())
    }
}

/// Arena of scopes for one translation unit.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    by_owner: HashMap<NodeId, ScopeId>,
}

impl ScopeTree {
    /// Creates a tree holding only the global scope, owned by `unit`.
    #[must_use]
    pub fn new(unit: NodeId) -> Self {
        let global = Scope {
            id: ScopeId::GLOBAL,
            kind: ScopeKind::Global,
            owner: unit,
            parent: None,
            children: Vec::new(),
            is_static: false,
            record: None,
            bindings: HashMap::new(),
            types: HashMap::new(),
        };
        Self {
            scopes: vec![global],
            by_owner: HashMap::from([(unit, ScopeId::GLOBAL)]),
        }
    }

    /// Adds a child scope of `parent` opened by `owner`.
    ///
    /// Returns `Err` with the already-attached scope if `owner` opened a scope
    /// before; an AST node owns at most one scope.
    pub fn add_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        owner: NodeId,
    ) -> Result<ScopeId, ScopeId> {
        if let Some(&existing) = self.by_owner.get(&owner) {
            return Err(existing);
        }
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(Scope {
            id,
            kind,
            owner,
            parent: Some(parent),
            children: Vec::new(),
            is_static: false,
            record: None,
            bindings: HashMap::new(),
            types: HashMap::new(),
        });
        self.scopes[parent.index()].children.push(id);
        self.by_owner.insert(owner, id);
        Ok(id)
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// The scope opened by `owner`, if any.
    #[must_use]
    pub fn scope_of(&self, owner: NodeId) -> Option<ScopeId> {
        self.by_owner.get(&owner).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterates over all scopes in creation order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// `scope` followed by each of its ancestors up to Global.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        let mut current = Some(scope);
        std::iter::from_fn(move || {
            let scope = self.scope(current?);
            current = scope.parent;
            Some(scope)
        })
    }

    /// True if `ancestor` is `scope` or encloses it.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        self.chain(scope).any(|s| s.id == ancestor)
    }

    /// The innermost Record scope enclosing (or equal to) `scope`.
    #[must_use]
    pub fn enclosing_record(&self, scope: ScopeId) -> Option<ScopeId> {
        self.chain(scope)
            .find(|s| s.kind == ScopeKind::Record)
            .map(|s| s.id)
    }

    /// The innermost Method scope enclosing (or equal to) `scope`, not looking
    /// past the nearest Record scope.
    #[must_use]
    pub fn enclosing_method(&self, scope: ScopeId) -> Option<ScopeId> {
        self.chain(scope)
            .take_while(|s| s.kind != ScopeKind::Record)
            .find(|s| s.kind == ScopeKind::Method)
            .map(|s| s.id)
    }

    /// Inserts a binding into `scope`, record names into their own namespace.
    ///
    /// Returns `Err` with the existing binding if the name is already bound in
    /// the same namespace of this very scope; the existing binding is left
    /// untouched.
    pub fn declare(&mut self, scope: ScopeId, binding: Binding) -> Result<(), Binding> {
        let scope = &mut self.scopes[scope.index()];
        let bindings = if binding.kind == BindingKind::Record {
            &mut scope.types
        } else {
            &mut scope.bindings
        };
        if let Some(existing) = bindings.get(&binding.name) {
            return Err(existing.clone());
        }
        bindings.insert(binding.name.clone(), binding);
        Ok(())
    }

    /// Looks up the variable `name` from `scope` outward, nearest scope first.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Binding)> {
        self.chain(scope)
            .find_map(|s| s.binding(name).map(|binding| (s.id, binding)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, target: u32, kind: BindingKind) -> Binding {
        Binding {
            name: name.into(),
            target: NodeId(target),
            kind,
            defined_at: Span::default(),
        }
    }

    #[test]
    fn new_tree_has_only_global() {
        let tree = ScopeTree::new(NodeId(0));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.scope(ScopeId::GLOBAL).kind, ScopeKind::Global);
        assert_eq!(tree.scope(ScopeId::GLOBAL).parent, None);
        assert_eq!(tree.scope_of(NodeId(0)), Some(ScopeId::GLOBAL));
    }

    #[test]
    fn add_scope_links_parent_and_child() {
        let mut tree = ScopeTree::new(NodeId(0));
        let record = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Record, NodeId(1))
            .unwrap();
        let method = tree.add_scope(record, ScopeKind::Method, NodeId(2)).unwrap();

        assert_eq!(tree.scope(method).parent, Some(record));
        assert_eq!(tree.scope(record).children, vec![method]);
        assert_eq!(tree.scope_of(NodeId(2)), Some(method));
    }

    #[test]
    fn owner_opens_at_most_one_scope() {
        let mut tree = ScopeTree::new(NodeId(0));
        let first = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Block, NodeId(5))
            .unwrap();
        let second = tree.add_scope(ScopeId::GLOBAL, ScopeKind::Block, NodeId(5));
        assert_eq!(second, Err(first));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn declare_rejects_duplicate_in_same_scope() {
        let mut tree = ScopeTree::new(NodeId(0));
        tree.declare(ScopeId::GLOBAL, binding("x", 1, BindingKind::Local)).unwrap();
        let err = tree.declare(ScopeId::GLOBAL, binding("x", 2, BindingKind::Local)).unwrap_err();
        assert_eq!(err.target, NodeId(1));
        // First binding is kept.
        let (_, found) = tree.lookup(ScopeId::GLOBAL, "x").unwrap();
        assert_eq!(found.target, NodeId(1));
    }

    #[test]
    fn record_names_have_their_own_namespace() {
        let mut tree = ScopeTree::new(NodeId(0));
        tree.declare(ScopeId::GLOBAL, binding("Node", 1, BindingKind::Field)).unwrap();
        tree.declare(ScopeId::GLOBAL, binding("Node", 2, BindingKind::Record)).unwrap();
        let err =
            tree.declare(ScopeId::GLOBAL, binding("Node", 3, BindingKind::Record)).unwrap_err();
        assert_eq!(err.target, NodeId(2));

        let global = tree.scope(ScopeId::GLOBAL);
        assert_eq!(global.binding("Node").unwrap().target, NodeId(1));
        assert_eq!(global.type_binding("Node").unwrap().target, NodeId(2));
        assert_eq!(global.bindings().count(), 2);
    }

    #[test]
    fn lookup_prefers_nearest_scope() {
        let mut tree = ScopeTree::new(NodeId(0));
        let inner = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Block, NodeId(1))
            .unwrap();
        tree.declare(ScopeId::GLOBAL, binding("x", 10, BindingKind::Local)).unwrap();
        tree.declare(inner, binding("x", 11, BindingKind::Local)).unwrap();

        assert_eq!(tree.lookup(inner, "x").unwrap().1.target, NodeId(11));
        assert_eq!(
            tree.lookup(ScopeId::GLOBAL, "x").unwrap().1.target,
            NodeId(10)
        );
    }

    #[test]
    fn sibling_scopes_do_not_see_each_other() {
        let mut tree = ScopeTree::new(NodeId(0));
        let first = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Loop, NodeId(1))
            .unwrap();
        let second = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Loop, NodeId(2))
            .unwrap();
        tree.declare(first, binding("i", 3, BindingKind::Local)).unwrap();

        assert!(tree.lookup(first, "i").is_some());
        assert!(tree.lookup(second, "i").is_none());
        assert!(!tree.is_ancestor(first, second));
    }

    #[test]
    fn enclosing_method_stops_at_record() {
        let mut tree = ScopeTree::new(NodeId(0));
        let record = tree
            .add_scope(ScopeId::GLOBAL, ScopeKind::Record, NodeId(1))
            .unwrap();
        let method = tree.add_scope(record, ScopeKind::Method, NodeId(2)).unwrap();
        let block = tree.add_scope(method, ScopeKind::Block, NodeId(3)).unwrap();
        let local_record = tree.add_scope(block, ScopeKind::Record, NodeId(4)).unwrap();

        assert_eq!(tree.enclosing_method(block), Some(method));
        assert_eq!(tree.enclosing_method(local_record), None);
        assert_eq!(tree.enclosing_record(block), Some(record));
        assert_eq!(tree.enclosing_record(local_record), Some(local_record));
    }
}
