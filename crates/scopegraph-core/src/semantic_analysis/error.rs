// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resolution issues.
//!
//! Every issue carries the [`Span`] of the node it is attached to and
//! integrates with [`miette`] for rendering. Only
//! [`ResolveErrorKind::MalformedScopeNesting`] aborts a unit; everything else is
//! collected and reported alongside a complete result.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::Span;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// A resolution issue attached to a source location.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct ResolveError {
    #[source]
    pub kind: ResolveErrorKind,
    #[label("here")]
    pub span: Span,
}

impl ResolveError {
    #[must_use]
    pub fn new(kind: ResolveErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn duplicate(name: impl Into<EcoString>, first: Span, span: Span) -> Self {
        Self::new(
            ResolveErrorKind::DuplicateDeclaration {
                name: name.into(),
                first,
            },
            span,
        )
    }

    pub fn unresolved(name: impl Into<EcoString>, reason: UnresolvedReason, span: Span) -> Self {
        Self::new(
            ResolveErrorKind::UnresolvedReference {
                name: name.into(),
                reason,
            },
            span,
        )
    }

    pub fn malformed(detail: impl Into<EcoString>, span: Span) -> Self {
        Self::new(
            ResolveErrorKind::MalformedScopeNesting {
                detail: detail.into(),
            },
            span,
        )
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Returns true if this issue aborts the unit it was found in.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ResolveErrorKind::MalformedScopeNesting { .. })
    }
}

/// Why a reference was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedReason {
    /// No binding along the scope chain.
    NoBinding,
    /// The base's type is not a known record.
    UnknownType,
    /// The lookup ran into a record whose fields are not available.
    ExternalRecord,
    /// The record and all its ancestors are known but declare no such field.
    NoSuchMember,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoBinding => "no declaration in scope",
            Self::UnknownType => "type of the base is unknown",
            Self::ExternalRecord => "declared in an external record",
            Self::NoSuchMember => "no such field in the record or its ancestors",
        };
        f.write_str(text)
    }
}

/// The kind of resolution issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveErrorKind {
    /// A name declared twice in the same scope; the first declaration wins.
    #[error("'{name}' is already declared in this scope")]
    DuplicateDeclaration { name: EcoString, first: Span },

    /// A reference with no declaration; likely an external symbol.
    #[error("unresolved reference '{name}': {reason}")]
    UnresolvedReference {
        name: EcoString,
        reason: UnresolvedReason,
    },

    /// The tree cannot be turned into a scope tree; the unit is aborted.
    #[error("malformed scope nesting: {detail}")]
    MalformedScopeNesting { detail: EcoString },

    /// A same-named local in a sibling scope that a flat lookup would confuse
    /// with the declaration actually chosen.
    #[error("'{name}' also names a local in a sibling scope")]
    AmbiguousShadow { name: EcoString, other: Span },

    /// An instance member reached without a receiver.
    #[error("instance member '{name}' used from a static context")]
    StaticContext { name: EcoString },
}

impl ResolveErrorKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateDeclaration { .. } | Self::MalformedScopeNesting { .. } => {
                Severity::Error
            }
            Self::AmbiguousShadow { .. } | Self::StaticContext { .. } => Severity::Warning,
            Self::UnresolvedReference { .. } => Severity::Note,
        }
    }
}
