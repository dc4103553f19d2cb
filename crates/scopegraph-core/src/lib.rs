// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope-tree construction and name binding for object-oriented syntax trees.
//!
//! This crate contains:
//! - The AST a front end hands over, one [`ast::TranslationUnit`] per file
//! - Shared walkers over that AST
//! - Source locations ([`source_analysis::Span`])
//! - Semantic analysis: scope trees, declaration registration and
//!   reference resolution
//!
//! ```
//! use scopegraph_core::prelude::*;
//!
//! let mut ids = NodeIdGen::new();
//! let use_site = Expression::reference(&mut ids, "count");
//! let use_id = match &use_site {
//!     Expression::Reference(reference) => reference.id,
//!     _ => unreachable!(),
//! };
//! let body = Block::new(&mut ids, vec![Statement::Expression(use_site)]);
//! let method = MethodDecl::new(&mut ids, "get", body);
//! let record = RecordDecl::new(&mut ids, "Counter")
//!     .with_field(FieldDecl::new(&mut ids, "count", TypeRef::named("int")))
//!     .with_method(method);
//! let mut units = vec![TranslationUnit::new(&mut ids, "Counter.java").with_record(record)];
//!
//! let index = RecordIndex::build(&units);
//! let results = analyse_program(&mut units, &index, &ResolveOptions::default());
//! let analysis = results[0].as_ref().unwrap();
//!
//! let slots = analysis.resolutions.reference(use_id).unwrap();
//! assert_eq!(slots.resolved.unwrap().kind, BindingKind::Field);
//! assert_eq!(slots.implicit_base.unwrap().kind, BindingKind::This);
//! ```

pub mod ast;
pub mod ast_walker;
pub mod semantic_analysis;
pub mod source_analysis;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{
        Block, Expression, FieldDecl, MethodDecl, NodeId, NodeIdGen, RecordDecl, Resolution,
        Statement, TranslationUnit, TypeRef,
    };
    pub use crate::semantic_analysis::{
        BindingKind, RecordIndex, ResolveError, ResolveOptions, UnitAnalysis, analyse_program,
        analyse_unit, resolve_unit,
    };
    pub use crate::source_analysis::Span;
}
