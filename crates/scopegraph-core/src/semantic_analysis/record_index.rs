// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Read-only index of every record known to an analysis run.
//!
//! The index is built from the completed declarations of all translation
//! units (plus externally supplied records) before any unit is resolved, and
//! is shared by the resolvers of all units. It answers two questions:
//! - which record does a type name written in some context denote, and
//! - which field does `Record.member` denote, walking the superclass chain.
//!
//! Field and superclass type names are resolved to qualified record names
//! once, when the index is finished.
//!
//! Single inheritance is assumed; cycles in the superclass chain are cut.

use crate::ast::{NodeId, RecordDecl, TranslationUnit};
use crate::source_analysis::Span;
use ecow::EcoString;
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A field as seen through the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub id: NodeId,
    pub name: EcoString,
    /// Qualified record name when the declared type names a known record,
    /// otherwise the type as written.
    pub ty: EcoString,
    pub is_static: bool,
}

/// Where a record's declaration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Declared in the named translation unit.
    Unit(EcoString),
    /// Supplied from outside the analysed sources.
    External,
}

/// A record as seen through the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub id: NodeId,
    /// Qualified name (`package.Outer.Inner`).
    pub name: EcoString,
    pub simple_name: EcoString,
    /// Qualified name of the enclosing record, for nested records.
    pub outer: Option<EcoString>,
    /// Qualified superclass name when known, otherwise as written.
    pub superclass: Option<EcoString>,
    /// `None` when the field list is unavailable (opaque external record).
    pub fields: Option<Vec<FieldInfo>>,
    pub origin: RecordOrigin,
    pub span: Span,
}

impl RecordInfo {
    /// Looks up a field declared directly on this record.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.as_ref()?.iter().find(|f| f.name == name)
    }
}

/// A record declared outside the analysed sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalRecord {
    /// Qualified name.
    pub name: EcoString,
    #[serde(default)]
    pub superclass: Option<EcoString>,
    /// Omit to declare the record opaque.
    #[serde(default)]
    pub fields: Option<Vec<ExternalField>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalField {
    pub name: EcoString,
    #[serde(rename = "type")]
    pub ty: EcoString,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// The lexical context a type name is written in.
#[derive(Debug, Clone, Default)]
pub struct TypeContext<'a> {
    pub package: Option<&'a str>,
    pub imports: &'a [EcoString],
    /// Qualified names of the enclosing records, innermost first.
    pub enclosing: Vec<EcoString>,
}

/// Outcome of a field lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup<'a> {
    Found {
        owner: &'a RecordInfo,
        field: &'a FieldInfo,
    },
    /// The record itself is not in the index.
    UnknownRecord,
    /// The search reached a record whose fields are unavailable.
    External,
    /// The whole chain is known and declares no such field.
    NotFound,
}

/// Two records registered under the same qualified name. The first one keeps
/// the name; the second is still reachable by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCollision {
    pub name: EcoString,
    pub kept: NodeId,
    pub kept_span: Span,
    pub dropped: NodeId,
}

/// Raw type names captured before the index is finished.
#[derive(Debug)]
struct PendingRecord {
    info: RecordInfo,
    superclass: Option<EcoString>,
    field_types: Vec<EcoString>,
    package: Option<EcoString>,
    imports: Vec<EcoString>,
}

/// Collects records from units and external declarations.
#[derive(Debug)]
pub struct RecordIndexBuilder {
    pending: Vec<PendingRecord>,
    next_external_id: u32,
}

impl Default for RecordIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_external_id: u32::MAX,
        }
    }

    /// Adds every record declared in `unit`, nested and local records included.
    pub fn add_unit(&mut self, unit: &TranslationUnit) {
        for record in &unit.records {
            let name = qualify(unit.package.as_deref(), &record.name);
            self.add_record(unit, record, name, None);
        }
    }

    fn add_record(
        &mut self,
        unit: &TranslationUnit,
        record: &RecordDecl,
        name: EcoString,
        outer: Option<EcoString>,
    ) {
        let fields = record
            .fields
            .iter()
            .map(|f| FieldInfo {
                id: f.id,
                name: f.name.clone(),
                ty: f.ty.name.clone(),
                is_static: f.is_static,
            })
            .collect::<Vec<_>>();
        self.pending.push(PendingRecord {
            superclass: record.superclass.as_ref().map(|s| s.name.clone()),
            field_types: fields.iter().map(|f| f.ty.clone()).collect(),
            info: RecordInfo {
                id: record.id,
                name: name.clone(),
                simple_name: record.name.clone(),
                outer,
                superclass: None,
                fields: Some(fields),
                origin: RecordOrigin::Unit(unit.name.clone()),
                span: record.span,
            },
            package: unit.package.clone(),
            imports: unit.imports.clone(),
        });
        for nested in &record.records {
            let nested_name = qualify(Some(&name), &nested.name);
            self.add_record(unit, nested, nested_name, Some(name.clone()));
        }
        for method in &record.methods {
            let Some(body) = &method.body else { continue };
            crate::ast_walker::local_records(&body.statements, &mut |local| {
                let local_name = local_record_name(Some(&name), local);
                self.add_record(unit, local, local_name, Some(name.clone()));
            });
        }
    }

    /// Adds an externally supplied record and returns the id assigned to it.
    ///
    /// External ids are handed out downward from `u32::MAX` so they do not
    /// collide with ids assigned by a front end.
    pub fn add_external(&mut self, record: ExternalRecord) -> NodeId {
        let id = self.fresh_external_id();
        let simple_name = record
            .name
            .rsplit('.')
            .next()
            .map_or_else(|| record.name.clone(), EcoString::from);
        let fields = record.fields.map(|fields| {
            fields
                .into_iter()
                .map(|f| FieldInfo {
                    id: self.fresh_external_id(),
                    name: f.name,
                    ty: f.ty,
                    is_static: f.is_static,
                })
                .collect::<Vec<_>>()
        });
        let field_types = fields.iter().flatten().map(|f| f.ty.clone()).collect();
        self.pending.push(PendingRecord {
            superclass: record.superclass,
            field_types,
            info: RecordInfo {
                id,
                name: record.name,
                simple_name,
                outer: None,
                superclass: None,
                fields,
                origin: RecordOrigin::External,
                span: Span::default(),
            },
            package: None,
            imports: Vec::new(),
        });
        id
    }

    fn fresh_external_id(&mut self) -> NodeId {
        let id = NodeId(self.next_external_id);
        self.next_external_id -= 1;
        id
    }

    /// Resolves superclass and field type names and freezes the index.
    ///
    /// When two records share a qualified name the first one added keeps it
    /// and the clash is listed in [`RecordIndex::collisions`].
    #[must_use]
    pub fn finish(self) -> RecordIndex {
        let mut index = RecordIndex::default();
        for pending in &self.pending {
            let slot = index.records.len();
            let info = pending.info.clone();
            index.by_id.insert(info.id, slot);
            match index.by_name.entry(info.name.clone()) {
                Entry::Occupied(entry) => {
                    let kept = &index.records[*entry.get()];
                    warn!(
                        name = %info.name,
                        kept = %kept.id,
                        dropped = %info.id,
                        "record name clash"
                    );
                    index.collisions.push(RecordCollision {
                        name: info.name.clone(),
                        kept: kept.id,
                        kept_span: kept.span,
                        dropped: info.id,
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(slot);
                }
            }
            index.records.push(info);
        }

        for (slot, pending) in self.pending.iter().enumerate() {
            let ctx = TypeContext {
                package: pending.package.as_deref(),
                imports: &pending.imports,
                enclosing: index.enclosing_of(slot),
            };
            let superclass = pending
                .superclass
                .as_ref()
                .map(|s| index.qualified_or_raw(s, &ctx));
            let field_types = pending
                .field_types
                .iter()
                .map(|t| index.qualified_or_raw(t, &ctx))
                .collect::<Vec<_>>();

            let info = &mut index.records[slot];
            info.superclass = superclass;
            if let Some(fields) = &mut info.fields {
                for (field, ty) in fields.iter_mut().zip(field_types) {
                    field.ty = ty;
                }
            }
        }

        for (slot, info) in index.records.iter().enumerate() {
            for (position, field) in info.fields.iter().flatten().enumerate() {
                index.fields_by_id.insert(field.id, (slot, position));
            }
        }
        debug!(
            records = index.records.len(),
            collisions = index.collisions.len(),
            "record index finished"
        );
        index
    }
}

/// Read-only record registry shared by every unit of a run.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: Vec<RecordInfo>,
    by_name: HashMap<EcoString, usize>,
    by_id: HashMap<NodeId, usize>,
    fields_by_id: HashMap<NodeId, (usize, usize)>,
    collisions: Vec<RecordCollision>,
}

impl RecordIndex {
    /// Convenience: an index over `units` with no external records.
    #[must_use]
    pub fn build(units: &[TranslationUnit]) -> Self {
        let mut builder = RecordIndexBuilder::new();
        for unit in units {
            builder.add_unit(unit);
        }
        builder.finish()
    }

    /// Looks up a record by qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RecordInfo> {
        self.by_name.get(name).map(|&slot| &self.records[slot])
    }

    /// Looks up a record by the id of its declaration.
    #[must_use]
    pub fn record_by_id(&self, id: NodeId) -> Option<&RecordInfo> {
        self.by_id.get(&id).map(|&slot| &self.records[slot])
    }

    /// Looks up a field by the id of its declaration.
    #[must_use]
    pub fn field_by_id(&self, id: NodeId) -> Option<&FieldInfo> {
        let &(slot, position) = self.fields_by_id.get(&id)?;
        self.records[slot].fields.as_ref()?.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Qualified names claimed by more than one record.
    #[must_use]
    pub fn collisions(&self) -> &[RecordCollision] {
        &self.collisions
    }

    /// Returns the ordered superclass chain for a record (excluding the record
    /// itself). Names that are not in the index end the chain after being
    /// listed. Cycles are cut at the first repeated record.
    #[must_use]
    pub fn superclass_chain(&self, record: &str) -> Vec<EcoString> {
        self.get(record)
            .map(|info| self.ancestors(info))
            .unwrap_or_default()
    }

    fn ancestors(&self, info: &RecordInfo) -> Vec<EcoString> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([info.name.clone()]);
        let mut next = info.superclass.clone();
        while let Some(superclass) = next {
            if !visited.insert(superclass.clone()) {
                break;
            }
            next = self.get(&superclass).and_then(|s| s.superclass.clone());
            chain.push(superclass);
        }
        chain
    }

    /// Finds `field` on `record` or, failing that, on its ancestors; the
    /// nearest declaration wins.
    #[must_use]
    pub fn find_field(&self, record: &str, field: &str) -> FieldLookup<'_> {
        match self.get(record) {
            Some(info) => self.find_field_in(info, field),
            None => FieldLookup::UnknownRecord,
        }
    }

    /// [`find_field`](Self::find_field) starting from a record already in
    /// hand, which need not own its qualified name.
    #[must_use]
    pub fn find_field_in<'a>(&'a self, record: &'a RecordInfo, field: &str) -> FieldLookup<'a> {
        let ancestors = self.ancestors(record);
        let chain = std::iter::once(Some(record))
            .chain(ancestors.iter().map(|name| self.get(name)));
        for info in chain {
            let Some(info) = info else {
                return FieldLookup::External;
            };
            let Some(fields) = &info.fields else {
                return FieldLookup::External;
            };
            if let Some(found) = fields.iter().find(|f| f.name == field) {
                return FieldLookup::Found { owner: info, field: found };
            }
        }
        FieldLookup::NotFound
    }

    /// Resolves a type name written in `ctx` to a known record.
    ///
    /// Candidates, in order: nested records of each enclosing record
    /// (innermost first), the current package, single-type imports,
    /// on-demand imports, and finally the name taken as fully qualified.
    #[must_use]
    pub fn resolve_type(&self, name: &str, ctx: &TypeContext<'_>) -> Option<&RecordInfo> {
        for enclosing in &ctx.enclosing {
            if let Some(info) = self.get(&qualify(Some(enclosing), name)) {
                return Some(info);
            }
        }
        if let Some(info) = self.get(&qualify(ctx.package, name)) {
            return Some(info);
        }
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        for import in ctx.imports {
            if import.ends_with(".*") {
                continue;
            }
            if import.rsplit('.').next() == Some(head) {
                let candidate = match rest {
                    Some(rest) => EcoString::from(format!("{import}.{rest}")),
                    None => import.clone(),
                };
                if let Some(info) = self.get(&candidate) {
                    return Some(info);
                }
            }
        }
        for package in ctx.imports.iter().filter_map(|i| i.strip_suffix(".*")) {
            if let Some(info) = self.get(&qualify(Some(package), name)) {
                return Some(info);
            }
        }
        self.get(name)
    }

    fn qualified_or_raw(&self, name: &str, ctx: &TypeContext<'_>) -> EcoString {
        self.resolve_type(name, ctx)
            .map_or_else(|| EcoString::from(name), |info| info.name.clone())
    }

    /// The record in `slot` and its enclosing records, innermost first.
    fn enclosing_of(&self, slot: usize) -> Vec<EcoString> {
        let mut chain = Vec::new();
        let mut current = self.records.get(slot);
        while let Some(info) = current {
            if chain.contains(&info.name) {
                break;
            }
            chain.push(info.name.clone());
            current = info.outer.as_deref().and_then(|outer| self.get(outer));
        }
        chain
    }
}

/// Joins a qualifier and a name with `.`.
pub(crate) fn qualify(qualifier: Option<&str>, name: &str) -> EcoString {
    match qualifier {
        Some(q) if !q.is_empty() => EcoString::from(format!("{q}.{name}")),
        _ => EcoString::from(name),
    }
}

/// Qualified name of a record declared in a method body.
///
/// Local records are keyed by declaration id, as in `App$12Local`, so
/// same-named local records of different methods stay apart.
pub(crate) fn local_record_name(enclosing: Option<&str>, record: &RecordDecl) -> EcoString {
    let key = format!("{}{}", record.id.0, record.name);
    match enclosing {
        Some(q) if !q.is_empty() => EcoString::from(format!("{q}${key}")),
        _ => EcoString::from(format!("${key}")),
    }
}
