// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location primitives shared by the AST and the resolver.
//!
//! Tokenizing and parsing happen in the front end; this crate only needs to
//! know where each node came from.

mod span;

pub use span::Span;
