// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Member resolution: `base.member` and inherited fields.
//!
//! The base is resolved first and reduced to a nominal record type:
//! - a variable or field contributes its declared type,
//! - a record named directly (`Counter.total`) or a receiver (`this`,
//!   `Outer.this`) contributes the record itself,
//! - `new T(..)` and `(T) e` contribute `T`,
//! - anything else (calls in particular) contributes nothing.
//!
//! A simple base with no binding is tried as a type name, and a dotted chain
//! of such names (`pkg.Type`) as a qualified record name. The member is then
//! looked up on the record and its superclass chain through the
//! [`RecordIndex`](super::record_index::RecordIndex), nearest declaration
//! first. Lookups that run into a record without a field list stay
//! unresolved.

use crate::ast::{Expression, MemberAccess, Resolution};
use crate::semantic_analysis::error::{ResolveError, ResolveErrorKind, UnresolvedReason};
use crate::semantic_analysis::name_resolver::{NameResolver, SimpleHit, field_hit};
use crate::semantic_analysis::record_index::{FieldLookup, RecordInfo, qualify};
use crate::semantic_analysis::scope::{BindingKind, Scope, ScopeId};
use tracing::trace;

/// The nominal type of a resolved base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BaseType<'a> {
    record: &'a RecordInfo,
    /// The base named the record itself rather than an instance of it.
    via_record_name: bool,
}

impl<'a> BaseType<'a> {
    fn instance(record: &'a RecordInfo) -> Self {
        Self {
            record,
            via_record_name: false,
        }
    }

    fn record(record: &'a RecordInfo) -> Self {
        Self {
            record,
            via_record_name: true,
        }
    }
}

impl<'a> NameResolver<'a> {
    /// Resolves `access`, its base first.
    pub(super) fn resolve_member(
        &mut self,
        access: &MemberAccess,
        scope: ScopeId,
    ) -> Result<Option<Resolution>, ResolveError> {
        if access.member.is_empty() {
            return Err(ResolveError::malformed(
                format!("member access {} without a member name", access.id),
                access.span,
            ));
        }
        let base = self.resolve_base(&access.base, scope)?;
        let resolved = match base {
            None => {
                self.unresolved(&access.member, UnresolvedReason::UnknownType, access.span);
                None
            }
            Some(base) if access.member == "this" => self.qualified_this(base, access, scope),
            Some(base) => self.member_of(base, access),
        };
        if let Some(resolution) = resolved {
            trace!(
                member = %access.member,
                target = %resolution.target,
                kind = %resolution.kind,
                "resolved member"
            );
            self.output.resolutions.insert_member(access.id, resolution);
        }
        Ok(resolved)
    }

    /// Resolves a base expression and reduces it to a record type.
    fn resolve_base(
        &mut self,
        base: &Expression,
        scope: ScopeId,
    ) -> Result<Option<BaseType<'a>>, ResolveError> {
        match base {
            Expression::Reference(reference) => {
                if reference.name.is_empty() {
                    return Err(ResolveError::malformed(
                        format!("reference {} without a name", reference.id),
                        reference.span,
                    ));
                }
                if let Some(hit) = self.lookup_simple(scope, &reference.name, reference.span) {
                    self.record_reference(reference, scope, Some(hit));
                    return Ok(self.type_of(hit.resolved, scope));
                }
                match self.resolve_type_name(&reference.name, scope, reference.span) {
                    Some(info) => {
                        let hit = SimpleHit::direct(Resolution::new(info.id, BindingKind::Record));
                        self.record_reference(reference, scope, Some(hit));
                        Ok(Some(BaseType::record(info)))
                    }
                    None => {
                        self.record_reference(reference, scope, None);
                        Ok(None)
                    }
                }
            }
            Expression::Member(access) => {
                if let Some(info) = self.qualified_record(access, scope) {
                    let resolution = Resolution::new(info.id, BindingKind::Record);
                    trace!(path = %info.name, "qualified record name");
                    self.output.resolutions.insert_member(access.id, resolution);
                    return Ok(Some(BaseType::record(info)));
                }
                let resolved = self.resolve_member(access, scope)?;
                Ok(resolved.and_then(|resolution| self.type_of(resolution, scope)))
            }
            Expression::New { ty, .. } | Expression::Cast { ty, .. } => {
                self.resolve_expression(base, scope)?;
                let info = self.resolve_type_name(&ty.name, scope, base.span());
                Ok(info.map(BaseType::instance))
            }
            _ => {
                self.resolve_expression(base, scope)?;
                Ok(None)
            }
        }
    }

    /// A dotted chain of names that denotes a record, such as
    /// `variables.ExternalClass`. Only tried when the head of the chain is
    /// neither a variable nor a type, so it can only be a package name.
    fn qualified_record(&self, access: &MemberAccess, scope: ScopeId) -> Option<&'a RecordInfo> {
        let index = self.index;
        let path = access.base.dotted_path()?;
        let head = path.split('.').next()?;
        if self.lookup_simple(scope, head, access.span).is_some() {
            return None;
        }
        if self.resolve_type_name(head, scope, access.span).is_some() {
            return None;
        }
        index.resolve_type(&qualify(Some(&path), &access.member), &self.type_context(scope))
    }

    /// The nominal type behind a resolution.
    fn type_of(&self, resolution: Resolution, scope: ScopeId) -> Option<BaseType<'a>> {
        let index = self.index;
        match resolution.kind {
            BindingKind::Record => index.record_by_id(resolution.target).map(BaseType::record),
            BindingKind::This | BindingKind::OuterThis => {
                index.record_by_id(resolution.target).map(BaseType::instance)
            }
            BindingKind::Field | BindingKind::StaticField => {
                let field = index.field_by_id(resolution.target)?;
                index.get(&field.ty).map(BaseType::instance)
            }
            BindingKind::Parameter | BindingKind::Local => {
                let decl = self.decls.get(resolution.target)?;
                let declared = decl.declared_type.as_ref()?;
                self.resolve_type_name(declared, scope, decl.span)
                    .map(BaseType::instance)
            }
        }
    }

    /// `R.this`: the receiver of the record named by the base.
    fn qualified_this(
        &mut self,
        base: BaseType<'a>,
        access: &MemberAccess,
        scope: ScopeId,
    ) -> Option<Resolution> {
        if !base.via_record_name {
            self.unresolved(&access.member, UnresolvedReason::NoSuchMember, access.span);
            return None;
        }
        let name = format!("{}.this", base.record.simple_name);
        let Some(hit) = self.lookup_simple(scope, &name, access.span) else {
            self.unresolved(&name, UnresolvedReason::NoBinding, access.span);
            return None;
        };
        if hit.static_context {
            self.report(ResolveError::new(
                ResolveErrorKind::StaticContext { name: name.into() },
                access.span,
            ));
        }
        Some(hit.resolved)
    }

    /// Looks `access.member` up on the base's record and its ancestors.
    fn member_of(&mut self, base: BaseType<'a>, access: &MemberAccess) -> Option<Resolution> {
        let index = self.index;
        let reason = match index.find_field_in(base.record, &access.member) {
            FieldLookup::Found { field, .. } => {
                if base.via_record_name && !field.is_static {
                    self.report(ResolveError::new(
                        ResolveErrorKind::StaticContext {
                            name: access.member.clone(),
                        },
                        access.span,
                    ));
                }
                let kind = if field.is_static {
                    BindingKind::StaticField
                } else {
                    BindingKind::Field
                };
                return Some(Resolution::new(field.id, kind));
            }
            FieldLookup::External => UnresolvedReason::ExternalRecord,
            FieldLookup::NotFound => UnresolvedReason::NoSuchMember,
            FieldLookup::UnknownRecord => UnresolvedReason::UnknownType,
        };
        // `Outer.Inner` names a nested record.
        if base.via_record_name {
            if let Some(nested) = index.get(&qualify(Some(&base.record.name), &access.member)) {
                return Some(Resolution::new(nested.id, BindingKind::Record));
            }
        }
        self.unresolved(&access.member, reason, access.span);
        None
    }

    /// A field `record_scope`'s record inherits, reached by a bare name.
    pub(super) fn inherited_field(
        &self,
        record_scope: &Scope,
        name: &str,
        level: usize,
        receiver: bool,
    ) -> Option<SimpleHit> {
        let record = self.index.record_by_id(record_scope.owner)?;
        match self.index.find_field_in(record, name) {
            FieldLookup::Found { field, .. } => Some(field_hit(
                record_scope.owner,
                level,
                receiver,
                field.id,
                field.is_static,
            )),
            _ => None,
        }
    }
}
